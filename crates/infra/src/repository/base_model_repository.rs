//! # BaseModelRepository
//!
//! ベースモデルカタログの参照を担当するリポジトリ。
//! カタログの管理（追加・削除）はこの API の管轄外のため、読み出しのみ。

use async_trait::async_trait;
use sqlx::PgPool;

use botforge_domain::base_model::{BaseModel, BaseModelId};

use crate::error::InfraError;

/// ベースモデルリポジトリトレイト
#[async_trait]
pub trait BaseModelRepository: Send + Sync {
   /// ID でベースモデルを検索する
   ///
   /// - `Ok(Some(model))`: モデルが見つかった場合
   /// - `Ok(None)`: モデルが見つからない場合
   /// - `Err(_)`: データベースエラー
   async fn find_by_id(&self, id: BaseModelId) -> Result<Option<BaseModel>, InfraError>;
}

/// PostgreSQL 実装の BaseModelRepository
#[derive(Debug, Clone)]
pub struct PostgresBaseModelRepository {
   pool: PgPool,
}

impl PostgresBaseModelRepository {
   /// 新しいリポジトリインスタンスを作成する
   pub fn new(pool: PgPool) -> Self {
      Self { pool }
   }
}

#[async_trait]
impl BaseModelRepository for PostgresBaseModelRepository {
   async fn find_by_id(&self, id: BaseModelId) -> Result<Option<BaseModel>, InfraError> {
      let row: Option<(i64, String)> =
         sqlx::query_as("SELECT id, name FROM base_models WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

      Ok(row.map(|(id, name)| BaseModel::from_db(BaseModelId::from_i64(id), name)))
   }
}
