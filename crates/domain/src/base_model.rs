//! # ベースモデル
//!
//! Bot の土台となる LLM モデルのカタログエントリを定義する。
//!
//! カタログの管理（追加・削除）はこの API の管轄外。
//! プロジェクト作成時に ID で参照され、Bot 生成サービスへ渡される。

define_i64_id! {
    /// ベースモデル ID（一意識別子）
    pub struct BaseModelId;
}

/// ベースモデルエンティティ
///
/// Bot 生成サービスが解釈するモデル名（例: `gpt-4o-mini`）を保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseModel {
    id:   BaseModelId,
    name: String,
}

impl BaseModel {
    /// 既存のデータからベースモデルを復元する（データベースから取得時）
    pub fn from_db(id: BaseModelId, name: String) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> BaseModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
