//! # PlanRepository
//!
//! サブスクリプションプランとユーザーへの階層割り当ての永続化を担当する
//! リポジトリ。
//!
//! ## 設計方針
//!
//! - **冪等な書き込み**: プラン上限・階層割り当てはともに upsert。
//!   アカウント基盤側の投影行がまだ存在しないユーザーにも割り当て可能
//! - **文字列で保存**: 階層は `SubscriptionLevel` の小文字表現で保存する

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use botforge_domain::{
   plan::{Plan, SubscriptionLevel},
   user::UserId,
};

use crate::error::InfraError;

/// プランリポジトリトレイト
///
/// プラン上限の更新、ユーザーへの階層割り当て、階層の参照を定義する。
#[async_trait]
pub trait PlanRepository: Send + Sync {
   /// プランの利用上限を設定する
   ///
   /// 同名のプランが存在すれば上限を更新し、なければ作成する。
   async fn upsert_limit(&self, plan: &Plan) -> Result<(), InfraError>;

   /// ユーザーにサブスクリプション階層を割り当てる
   async fn assign_level(
      &self,
      user_id: UserId,
      level: SubscriptionLevel,
   ) -> Result<(), InfraError>;

   /// ユーザーの現在のサブスクリプション階層を取得する
   ///
   /// - `Ok(Some(level))`: 割り当てが存在する場合
   /// - `Ok(None)`: ユーザーの投影行が存在しない場合
   async fn subscription_level(
      &self,
      user_id: UserId,
   ) -> Result<Option<SubscriptionLevel>, InfraError>;

   /// 階層ごとのユーザー数を取得する（管理者統計用）
   async fn count_users_by_level(&self)
   -> Result<Vec<(SubscriptionLevel, i64)>, InfraError>;
}

/// PostgreSQL 実装の PlanRepository
#[derive(Debug, Clone)]
pub struct PostgresPlanRepository {
   pool: PgPool,
}

impl PostgresPlanRepository {
   /// 新しいリポジトリインスタンスを作成する
   pub fn new(pool: PgPool) -> Self {
      Self { pool }
   }
}

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
   async fn upsert_limit(&self, plan: &Plan) -> Result<(), InfraError> {
      sqlx::query(
         r#"
            INSERT INTO plans (name, usage_limit)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET usage_limit = EXCLUDED.usage_limit
            "#,
      )
      .bind(plan.name().as_str())
      .bind(plan.limit())
      .execute(&self.pool)
      .await?;

      Ok(())
   }

   async fn assign_level(
      &self,
      user_id: UserId,
      level: SubscriptionLevel,
   ) -> Result<(), InfraError> {
      let level_str: &str = level.into();

      sqlx::query(
         r#"
            INSERT INTO users (id, subscription_level)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET subscription_level = EXCLUDED.subscription_level
            "#,
      )
      .bind(user_id.as_i64())
      .bind(level_str)
      .execute(&self.pool)
      .await?;

      Ok(())
   }

   async fn subscription_level(
      &self,
      user_id: UserId,
   ) -> Result<Option<SubscriptionLevel>, InfraError> {
      let level: Option<String> =
         sqlx::query_scalar("SELECT subscription_level FROM users WHERE id = $1")
            .bind(user_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

      let Some(level) = level else {
         return Ok(None);
      };

      let level = SubscriptionLevel::from_str(&level)
         .map_err(|e| InfraError::unexpected(e.to_string()))?;

      Ok(Some(level))
   }

   async fn count_users_by_level(
      &self,
   ) -> Result<Vec<(SubscriptionLevel, i64)>, InfraError> {
      let rows: Vec<(String, i64)> = sqlx::query_as(
         r#"
            SELECT subscription_level, COUNT(*)
            FROM users
            GROUP BY subscription_level
            ORDER BY subscription_level
            "#,
      )
      .fetch_all(&self.pool)
      .await?;

      rows
         .into_iter()
         .map(|(level, count)| {
            let level = SubscriptionLevel::from_str(&level)
               .map_err(|e| InfraError::unexpected(e.to_string()))?;
            Ok((level, count))
         })
         .collect()
   }
}
