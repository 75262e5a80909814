//! # プロジェクトユースケース
//!
//! プロジェクトの件数取得・一覧・ファイル取得・アクセス判定・作成に関する
//! ビジネスロジックを実装する。
//!
//! すべての操作は認証済みユーザーを前提とし（認証ゲートはハンドラ側）、
//! プロジェクト単位の所有権チェックをここで行う。所有権チェックの結果は
//! 例外ではなく Outcome 列挙型としてハンドラへ返す。

use botforge_domain::{
   plan::SubscriptionLevel,
   project::{NewProject, Project, ProjectId},
   user::UserId,
};
use botforge_infra::repository::{BaseModelRepository, PlanRepository, ProjectRepository};

use crate::{client::llm::LlmClient, error::ApiError};

/// ファイル取得の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFileOutcome {
   /// 取得成功: ダウンロードファイル名の元になるプロジェクト名と、
   /// 改行結合済みの本文
   File { name: String, content: String },
   /// 呼び出しユーザーが所有者でない
   NotOwner,
}

/// アクセス判定の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessCheckOutcome {
   /// 所有者かつ advanced 階層
   Granted,
   /// 所有者でない、または階層が不足
   Denied,
}

/// プロジェクト作成の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateProjectOutcome {
   /// 作成成功（採番されたプロジェクト ID）
   Created(ProjectId),
   /// 申告された所有者が呼び出しユーザーと一致しない
   NotOwner,
}

/// プロジェクトユースケース実装
///
/// P: ProjectRepository, M: BaseModelRepository, S: PlanRepository, L: LlmClient
pub struct ProjectUseCaseImpl<P, M, S, L> {
   project_repo:    P,
   base_model_repo: M,
   plan_repo:       S,
   llm_client:      L,
}

impl<P, M, S, L> ProjectUseCaseImpl<P, M, S, L>
where
   P: ProjectRepository,
   M: BaseModelRepository,
   S: PlanRepository,
   L: LlmClient,
{
   pub fn new(project_repo: P, base_model_repo: M, plan_repo: S, llm_client: L) -> Self {
      Self {
         project_repo,
         base_model_repo,
         plan_repo,
         llm_client,
      }
   }

   /// ユーザーが所有するプロジェクト数を取得する
   pub async fn count_projects(&self, user_id: UserId) -> Result<i64, ApiError> {
      Ok(self.project_repo.count_by_owner(user_id).await?)
   }

   /// ユーザーのプロジェクトをページング付きで取得する
   ///
   /// 格納順（ID 昇順）で返す。
   pub async fn list_projects(
      &self,
      user_id: UserId,
      offset: i64,
      limit: i64,
   ) -> Result<Vec<Project>, ApiError> {
      Ok(self.project_repo.find_by_owner(user_id, offset, limit).await?)
   }

   /// プロジェクトの収集データをダウンロード用に取得する
   ///
   /// 所有権チェックは取得したプロジェクトの所有者に対して行う。
   /// 所有者でない場合はデータ行を読まずに `NotOwner` を返す。
   pub async fn fetch_file(
      &self,
      user_id: UserId,
      project_id: ProjectId,
   ) -> Result<FetchFileOutcome, ApiError> {
      let project = self
         .project_repo
         .find_by_id(project_id)
         .await?
         .ok_or_else(|| ApiError::NotFound(format!("プロジェクト {}", project_id)))?;

      if !project.is_owned_by(user_id) {
         return Ok(FetchFileOutcome::NotOwner);
      }

      let lines = self.project_repo.data_lines(project_id).await?;

      Ok(FetchFileOutcome::File {
         name:    project.name().to_string(),
         content: lines.join("\n"),
      })
   }

   /// プロジェクトへの高度なアクセス可否を判定する
   ///
   /// 所有者であり、かつサブスクリプション階層が advanced の場合のみ
   /// `Granted` を返す。
   pub async fn check_access(
      &self,
      user_id: UserId,
      project_id: ProjectId,
   ) -> Result<AccessCheckOutcome, ApiError> {
      let project = self
         .project_repo
         .find_by_id(project_id)
         .await?
         .ok_or_else(|| ApiError::NotFound(format!("プロジェクト {}", project_id)))?;

      if !project.is_owned_by(user_id) {
         return Ok(AccessCheckOutcome::Denied);
      }

      let level = self.plan_repo.subscription_level(user_id).await?;

      match level {
         Some(SubscriptionLevel::Advanced) => Ok(AccessCheckOutcome::Granted),
         _ => Ok(AccessCheckOutcome::Denied),
      }
   }

   /// プロジェクトを作成し、対応する Bot をプロビジョニングする
   ///
   /// ## 処理順序
   ///
   /// 1. 申告された所有者と呼び出しユーザーの一致チェック
   /// 2. ベースモデルの解決（存在しない場合は NotFound）
   /// 3. Bot 生成サービスへのプロビジョニング要求
   /// 4. プロジェクトレコードの保存（アップロードファイル込み）
   ///
   /// プロビジョニングに失敗した場合はレコードを保存しない。
   pub async fn create_project(
      &self,
      session_user: UserId,
      input: NewProject,
   ) -> Result<CreateProjectOutcome, ApiError> {
      if input.user_id != session_user {
         return Ok(CreateProjectOutcome::NotOwner);
      }

      let base_model = self
         .base_model_repo
         .find_by_id(input.base_model_id)
         .await?
         .ok_or_else(|| {
            ApiError::NotFound(format!("ベースモデル {}", input.base_model_id))
         })?;

      self
         .llm_client
         .create_bot(&input.name, &input.prompt, &base_model)
         .await?;

      let id = self.project_repo.insert(&input).await?;

      Ok(CreateProjectOutcome::Created(id))
   }
}
