//! # 管理者 API ハンドラ
//!
//! 管理 Bot から呼び出されるエンドポイントを実装する。
//!
//! ## エンドポイント
//!
//! - `POST /admin/limits` - プランの利用上限を変更
//! - `POST /admin/access` - ユーザーにサブスクリプション階層を割り当て
//! - `GET /admin/stats` - プラットフォーム統計
//!
//! ## 認証
//!
//! 管理トークンは `?token=` クエリパラメータで受け取り、ハンドラが
//! 直接検証する。検証に失敗した場合はそのステータスコードを
//! `{ "status": N }` 本文として返し、永続化は行わない。

use std::sync::Arc;

use axum::{
   Json,
   extract::{Query, State},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use botforge_domain::{
   auth::{AuthState, status},
   plan::{Plan, SubscriptionLevel},
   user::UserId,
   value_objects::PlanName,
};
use botforge_infra::{
   TokenDecoder,
   repository::{PlanRepository, ProjectRepository},
};

use crate::{error::ApiError, handler::status_response, usecase::admin::AdminUseCaseImpl};

/// 管理者ハンドラの State
///
/// S: PlanRepository, P: ProjectRepository
pub struct AdminState<S, P> {
   pub decoder: Arc<dyn TokenDecoder>,
   pub usecase: AdminUseCaseImpl<S, P>,
}

// --- リクエスト/レスポンス型 ---

/// 管理トークンのクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
   pub token: String,
}

/// プラン上限変更リクエスト
#[derive(Debug, Deserialize)]
pub struct ChangeLimitsRequest {
   pub name:  String,
   pub limit: i64,
}

/// 階層割り当てリクエスト
#[derive(Debug, Deserialize)]
pub struct GrantAccessRequest {
   pub user_id: i64,
   pub plan:    SubscriptionLevel,
}

/// 階層別ユーザー数 DTO
#[derive(Debug, Serialize)]
pub struct LevelCountDto {
   pub level: SubscriptionLevel,
   pub users: i64,
}

/// プラットフォーム統計 DTO
#[derive(Debug, Serialize)]
pub struct AdminStatsDto {
   pub users_by_level: Vec<LevelCountDto>,
   pub total_projects: i64,
}

// --- ハンドラ ---

/// プランの利用上限を変更する
///
/// ## エンドポイント
/// POST /admin/limits?token={token}
#[tracing::instrument(skip_all)]
pub async fn change_limits<S, P>(
   State(state): State<Arc<AdminState<S, P>>>,
   Query(query): Query<TokenQuery>,
   Json(request): Json<ChangeLimitsRequest>,
) -> Result<Response, ApiError>
where
   S: PlanRepository,
   P: ProjectRepository,
{
   if let AuthState::Denied(code) = state.decoder.decode(&query.token) {
      return Ok(status_response(code));
   }

   let name = PlanName::new(&request.name).map_err(|e| ApiError::BadRequest(e.to_string()))?;
   let plan = Plan::new(name, request.limit).map_err(|e| ApiError::BadRequest(e.to_string()))?;

   state.usecase.change_limits(&plan).await?;

   Ok(status_response(status::OK))
}

/// ユーザーにサブスクリプション階層を割り当てる
///
/// ## エンドポイント
/// POST /admin/access?token={token}
#[tracing::instrument(skip_all)]
pub async fn give_access<S, P>(
   State(state): State<Arc<AdminState<S, P>>>,
   Query(query): Query<TokenQuery>,
   Json(request): Json<GrantAccessRequest>,
) -> Result<Response, ApiError>
where
   S: PlanRepository,
   P: ProjectRepository,
{
   if let AuthState::Denied(code) = state.decoder.decode(&query.token) {
      return Ok(status_response(code));
   }

   state
      .usecase
      .grant_access(UserId::from_i64(request.user_id), request.plan)
      .await?;

   Ok(status_response(status::OK))
}

/// プラットフォーム統計を取得する
///
/// ## エンドポイント
/// GET /admin/stats?token={token}
#[tracing::instrument(skip_all)]
pub async fn view_stats<S, P>(
   State(state): State<Arc<AdminState<S, P>>>,
   Query(query): Query<TokenQuery>,
) -> Result<Response, ApiError>
where
   S: PlanRepository,
   P: ProjectRepository,
{
   if let AuthState::Denied(code) = state.decoder.decode(&query.token) {
      return Ok(status_response(code));
   }

   let stats = state.usecase.stats().await?;

   let dto = AdminStatsDto {
      users_by_level: stats
         .users_by_level
         .into_iter()
         .map(|(level, users)| LevelCountDto { level, users })
         .collect(),
      total_projects: stats.total_projects,
   };

   Ok((StatusCode::OK, Json(dto)).into_response())
}
