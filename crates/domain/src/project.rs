//! # プロジェクト
//!
//! プロジェクトエンティティとそれに関連する入力型を定義する。
//!
//! プロジェクトは「プロンプト + ベースモデル + アップロードファイル」を
//! 束ねたユーザー所有の作業単位で、作成時に対応する Bot が
//! 生成サービス側にプロビジョニングされる。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: ProjectId は i64 をラップし、型安全性を確保
//! - **不変性**: エンティティフィールドは不変。作成後の更新・削除は存在しない
//! - **ファイル本体の分離**: アップロードファイルの生バイト列は
//!   [`NewProject`]（挿入時の入力）のみが運び、読み出しエンティティには
//!   含めない。一覧・件数取得でファイルを読み込まないため
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use botforge_domain::{
//!     base_model::BaseModelId,
//!     project::{Project, ProjectId},
//!     user::UserId,
//!     value_objects::{MimeType, ProjectName, Prompt, SystemName},
//! };
//!
//! let project = Project::from_db(
//!     ProjectId::from_i64(1),
//!     UserId::from_i64(42),
//!     ProjectName::new("サポート Bot")?,
//!     SystemName::new("support_bot")?,
//!     MimeType::new("text/plain")?,
//!     BaseModelId::from_i64(3),
//!     Prompt::new("あなたは丁寧なサポート担当です。")?,
//!     chrono::Utc::now(),
//! );
//!
//! assert!(project.is_owned_by(UserId::from_i64(42)));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};

use crate::{
    base_model::BaseModelId,
    user::UserId,
    value_objects::{MimeType, ProjectName, Prompt, SystemName},
};

define_i64_id! {
    /// プロジェクト ID（一意識別子）
    ///
    /// データベースのシーケンスで採番される。
    pub struct ProjectId;
}

/// プロジェクトエンティティ
///
/// ユーザーが所有する Bot プロジェクトを表現する。
/// 作成されたら読み出し専用で、更新・削除の操作は存在しない。
///
/// # 不変条件
///
/// - `user_id` は作成時に申告された所有者と一致する
/// - 所有者以外はファイル取得・アクセス判定の対象にならない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id: ProjectId,
    user_id: UserId,
    name: ProjectName,
    system_name: SystemName,
    mimetype: MimeType,
    base_model_id: BaseModelId,
    prompt: Prompt,
    created_at: DateTime<Utc>,
}

impl Project {
    /// 既存のデータからプロジェクトを復元する（データベースから取得時）
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: ProjectId,
        user_id: UserId,
        name: ProjectName,
        system_name: SystemName,
        mimetype: MimeType,
        base_model_id: BaseModelId,
        prompt: Prompt,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            system_name,
            mimetype,
            base_model_id,
            prompt,
            created_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn system_name(&self) -> &SystemName {
        &self.system_name
    }

    pub fn mimetype(&self) -> &MimeType {
        &self.mimetype
    }

    pub fn base_model_id(&self) -> BaseModelId {
        self.base_model_id
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // ビジネスロジックメソッド

    /// 指定ユーザーがこのプロジェクトの所有者か判定する
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// プロジェクト作成の入力
///
/// ID はデータベース側で採番されるため含まない。
/// アップロードファイルの生バイト列はここでのみ運ばれ、
/// 挿入後は読み出しエンティティに含まれない。
#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: UserId,
    pub name: ProjectName,
    pub system_name: SystemName,
    pub mimetype: MimeType,
    pub base_model_id: BaseModelId,
    pub prompt: Prompt,
    pub file: Vec<u8>,
}
