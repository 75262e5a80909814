//! # 管理者ユースケース
//!
//! プラン上限の変更、ユーザーへの階層割り当て、プラットフォーム統計の
//! 取得に関するビジネスロジックを実装する。
//!
//! トークンの検証ゲートはハンドラ側の責務。ここに到達する呼び出しは
//! 検証済みの管理トークンを持つ。

use botforge_domain::{
   plan::{Plan, SubscriptionLevel},
   user::UserId,
};
use botforge_infra::repository::{PlanRepository, ProjectRepository};

use crate::error::ApiError;

/// プラットフォーム統計
///
/// 管理 Bot のダッシュボードに表示される読み出し専用の集計値。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminStats {
   /// 階層ごとのユーザー数
   pub users_by_level: Vec<(SubscriptionLevel, i64)>,
   /// 全プロジェクト数
   pub total_projects: i64,
}

/// 管理者ユースケース実装
///
/// S: PlanRepository, P: ProjectRepository
pub struct AdminUseCaseImpl<S, P> {
   plan_repo:    S,
   project_repo: P,
}

impl<S, P> AdminUseCaseImpl<S, P>
where
   S: PlanRepository,
   P: ProjectRepository,
{
   pub fn new(plan_repo: S, project_repo: P) -> Self {
      Self {
         plan_repo,
         project_repo,
      }
   }

   /// プランの利用上限を変更する
   pub async fn change_limits(&self, plan: &Plan) -> Result<(), ApiError> {
      self.plan_repo.upsert_limit(plan).await?;
      Ok(())
   }

   /// ユーザーにサブスクリプション階層を割り当てる
   pub async fn grant_access(
      &self,
      user_id: UserId,
      level: SubscriptionLevel,
   ) -> Result<(), ApiError> {
      self.plan_repo.assign_level(user_id, level).await?;
      Ok(())
   }

   /// プラットフォーム統計を取得する
   pub async fn stats(&self) -> Result<AdminStats, ApiError> {
      let users_by_level = self.plan_repo.count_users_by_level().await?;
      let total_projects = self.project_repo.count_all().await?;

      Ok(AdminStats {
         users_by_level,
         total_projects,
      })
   }
}
