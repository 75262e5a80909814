//! # プロジェクト API ハンドラ
//!
//! Web フロントエンドから呼び出されるプロジェクト関連エンドポイントを
//! 実装する。
//!
//! ## エンドポイント
//!
//! - `GET /project/count` - 所有プロジェクト数
//! - `GET /project/all` - 所有プロジェクト一覧（ページング付き）
//! - `GET /project/file` - 収集データのダウンロード
//! - `GET /project/access` - 高度なアクセス可否の判定
//! - `POST /project/new` - プロジェクト作成（multipart）
//!
//! ## 認証
//!
//! 認証状態はミドルウェア（[`crate::middleware::auth`]）がリクエスト拡張に
//! 積む。各ハンドラは最初にそれを検査し、認証済みでなければ
//! そのステータスコードを `{ "status": N }` 本文として返す。

use std::sync::Arc;

use axum::{
   Extension,
   Json,
   extract::{Multipart, Query, State},
   http::{StatusCode, header},
   response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use botforge_domain::{
   auth::{AuthState, status},
   base_model::BaseModelId,
   project::{NewProject, Project, ProjectId},
   user::UserId,
   value_objects::{MimeType, ProjectName, Prompt, SystemName},
};
use botforge_infra::repository::{BaseModelRepository, PlanRepository, ProjectRepository};
use botforge_shared::StatusResponse;

use crate::{
   client::llm::LlmClient,
   error::ApiError,
   handler::status_response,
   usecase::project::{
      AccessCheckOutcome,
      CreateProjectOutcome,
      FetchFileOutcome,
      ProjectUseCaseImpl,
   },
};

/// 一覧取得の limit 上限（リソース枯渇対策）
const MAX_LIST_LIMIT: u32 = 100;

/// プロジェクトハンドラの State
///
/// P: ProjectRepository, M: BaseModelRepository, S: PlanRepository, L: LlmClient
pub struct ProjectState<P, M, S, L> {
   pub usecase: ProjectUseCaseImpl<P, M, S, L>,
}

// --- リクエスト/レスポンス型 ---

/// 件数レスポンス
#[derive(Debug, Serialize)]
pub struct CountResponse {
   pub user_id: i64,
   pub object:  String,
   pub count:   i64,
}

/// 一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListQuery {
   /// スキップする件数（デフォルト 0）
   #[serde(default)]
   pub offset: u32,
   /// 最大取得件数（デフォルト 10、1〜100 に丸める）
   #[serde(default = "default_limit")]
   pub limit:  u32,
}

fn default_limit() -> u32 {
   10
}

/// プロジェクト指定のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
   pub project_id: i64,
}

/// プロジェクト概要 DTO（一覧用、プロンプトとファイルは含まない）
#[derive(Debug, Serialize)]
pub struct ProjectDto {
   pub id:            i64,
   pub user_id:       i64,
   pub name:          String,
   pub system_name:   String,
   pub mimetype:      String,
   pub base_model_id: i64,
   pub created_at:    String,
}

impl ProjectDto {
   fn from_project(project: &Project) -> Self {
      Self {
         id:            project.id().as_i64(),
         user_id:       project.user_id().as_i64(),
         name:          project.name().as_str().to_string(),
         system_name:   project.system_name().as_str().to_string(),
         mimetype:      project.mimetype().as_str().to_string(),
         base_model_id: project.base_model_id().as_i64(),
         created_at:    project.created_at().to_rfc3339(),
      }
   }
}

// --- ハンドラ ---

/// 所有プロジェクト数を取得する
///
/// ## エンドポイント
/// GET /project/count
#[tracing::instrument(skip_all)]
pub async fn count_projects<P, M, S, L>(
   State(state): State<Arc<ProjectState<P, M, S, L>>>,
   Extension(auth): Extension<AuthState>,
) -> Result<Response, ApiError>
where
   P: ProjectRepository,
   M: BaseModelRepository,
   S: PlanRepository,
   L: LlmClient,
{
   let Some(user_id) = auth.user_id() else {
      return Ok(status_response(auth.status()));
   };

   let count = state.usecase.count_projects(user_id).await?;

   let response = CountResponse {
      user_id: user_id.as_i64(),
      object:  "projects".to_string(),
      count,
   };

   Ok((StatusCode::OK, Json(response)).into_response())
}

/// 所有プロジェクト一覧を取得する
///
/// 格納順（挿入順）で返す。
///
/// ## エンドポイント
/// GET /project/all?offset={offset}&limit={limit}
#[tracing::instrument(skip_all)]
pub async fn list_projects<P, M, S, L>(
   State(state): State<Arc<ProjectState<P, M, S, L>>>,
   Extension(auth): Extension<AuthState>,
   Query(query): Query<ListQuery>,
) -> Result<Response, ApiError>
where
   P: ProjectRepository,
   M: BaseModelRepository,
   S: PlanRepository,
   L: LlmClient,
{
   let Some(user_id) = auth.user_id() else {
      return Ok(status_response(auth.status()));
   };

   let limit = query.limit.clamp(1, MAX_LIST_LIMIT);

   let projects = state
      .usecase
      .list_projects(user_id, i64::from(query.offset), i64::from(limit))
      .await?;

   let response: Vec<ProjectDto> = projects.iter().map(ProjectDto::from_project).collect();

   Ok((StatusCode::OK, Json(response)).into_response())
}

/// プロジェクトの収集データをダウンロードする
///
/// 所有者のみ取得でき、`<プロジェクト名>.txt` という添付ファイルとして
/// 改行結合済みの本文を返す。
///
/// ## エンドポイント
/// GET /project/file?project_id={project_id}
#[tracing::instrument(skip_all)]
pub async fn get_project_file<P, M, S, L>(
   State(state): State<Arc<ProjectState<P, M, S, L>>>,
   Extension(auth): Extension<AuthState>,
   Query(query): Query<ProjectQuery>,
) -> Result<Response, ApiError>
where
   P: ProjectRepository,
   M: BaseModelRepository,
   S: PlanRepository,
   L: LlmClient,
{
   let Some(user_id) = auth.user_id() else {
      return Ok(status_response(auth.status()));
   };

   let outcome = state
      .usecase
      .fetch_file(user_id, ProjectId::from_i64(query.project_id))
      .await?;

   match outcome {
      FetchFileOutcome::NotOwner => Ok(status_response(status::UNAUTHORIZED)),
      FetchFileOutcome::File { name, content } => {
         let disposition = format!("attachment; filename=\"{name}.txt\"");

         Ok((
            StatusCode::OK,
            [
               (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
               (header::CONTENT_DISPOSITION, disposition),
            ],
            content,
         )
            .into_response())
      }
   }
}

/// プロジェクトへの高度なアクセス可否を判定する
///
/// 所有者かつ advanced 階層の場合のみ `{ "status": 200 }` を返す。
///
/// ## エンドポイント
/// GET /project/access?project_id={project_id}
#[tracing::instrument(skip_all)]
pub async fn check_project_access<P, M, S, L>(
   State(state): State<Arc<ProjectState<P, M, S, L>>>,
   Extension(auth): Extension<AuthState>,
   Query(query): Query<ProjectQuery>,
) -> Result<Response, ApiError>
where
   P: ProjectRepository,
   M: BaseModelRepository,
   S: PlanRepository,
   L: LlmClient,
{
   let Some(user_id) = auth.user_id() else {
      return Ok(status_response(auth.status()));
   };

   let outcome = state
      .usecase
      .check_access(user_id, ProjectId::from_i64(query.project_id))
      .await?;

   match outcome {
      AccessCheckOutcome::Granted => Ok(status_response(status::OK)),
      AccessCheckOutcome::Denied => Ok(status_response(status::UNAUTHORIZED)),
   }
}

/// プロジェクトを作成する
///
/// multipart 本文からフィールドとアップロードファイルを読み取り、
/// Bot のプロビジョニングとレコードの保存を行う。
///
/// ## エンドポイント
/// POST /project/new
#[tracing::instrument(skip_all)]
pub async fn create_project<P, M, S, L>(
   State(state): State<Arc<ProjectState<P, M, S, L>>>,
   Extension(auth): Extension<AuthState>,
   multipart: Multipart,
) -> Result<Response, ApiError>
where
   P: ProjectRepository,
   M: BaseModelRepository,
   S: PlanRepository,
   L: LlmClient,
{
   let Some(user_id) = auth.user_id() else {
      return Ok(status_response(auth.status()));
   };

   let input = read_new_project(multipart).await?;

   match state.usecase.create_project(user_id, input).await? {
      CreateProjectOutcome::NotOwner => Ok(status_response(status::UNAUTHORIZED)),
      CreateProjectOutcome::Created(_) => Ok((
         StatusCode::CREATED,
         Json(StatusResponse::new(status::CREATED)),
      )
         .into_response()),
   }
}

/// multipart 本文からプロジェクト作成の入力を組み立てる
///
/// フィールド名は `user_id` / `name` / `system_name` / `mimetype` /
/// `base_model_id` / `prompt` / `file`。未知のフィールドは無視する。
async fn read_new_project(mut multipart: Multipart) -> Result<NewProject, ApiError> {
   let mut user_id: Option<i64> = None;
   let mut name: Option<String> = None;
   let mut system_name: Option<String> = None;
   let mut mimetype: Option<String> = None;
   let mut base_model_id: Option<i64> = None;
   let mut prompt: Option<String> = None;
   let mut file: Option<Vec<u8>> = None;

   while let Some(field) = multipart
      .next_field()
      .await
      .map_err(|e| ApiError::BadRequest(format!("multipart の読み取りに失敗しました: {e}")))?
   {
      let field_name = field.name().unwrap_or_default().to_string();

      match field_name.as_str() {
         "user_id" => user_id = Some(parse_i64_field(&field_name, field).await?),
         "name" => name = Some(text_field(&field_name, field).await?),
         "system_name" => system_name = Some(text_field(&field_name, field).await?),
         "mimetype" => mimetype = Some(text_field(&field_name, field).await?),
         "base_model_id" => base_model_id = Some(parse_i64_field(&field_name, field).await?),
         "prompt" => prompt = Some(text_field(&field_name, field).await?),
         "file" => {
            let bytes = field
               .bytes()
               .await
               .map_err(|e| ApiError::BadRequest(format!("file の読み取りに失敗しました: {e}")))?;
            file = Some(bytes.to_vec());
         }
         _ => {}
      }
   }

   let user_id = user_id.ok_or_else(|| missing_field("user_id"))?;
   let name = name.ok_or_else(|| missing_field("name"))?;
   let system_name = system_name.ok_or_else(|| missing_field("system_name"))?;
   let mimetype = mimetype.ok_or_else(|| missing_field("mimetype"))?;
   let base_model_id = base_model_id.ok_or_else(|| missing_field("base_model_id"))?;
   let prompt = prompt.ok_or_else(|| missing_field("prompt"))?;
   let file = file.ok_or_else(|| missing_field("file"))?;

   Ok(NewProject {
      user_id:       UserId::from_i64(user_id),
      name:          ProjectName::new(name).map_err(|e| ApiError::BadRequest(e.to_string()))?,
      system_name:   SystemName::new(system_name)
         .map_err(|e| ApiError::BadRequest(e.to_string()))?,
      mimetype:      MimeType::new(mimetype).map_err(|e| ApiError::BadRequest(e.to_string()))?,
      base_model_id: BaseModelId::from_i64(base_model_id),
      prompt:        Prompt::new(prompt).map_err(|e| ApiError::BadRequest(e.to_string()))?,
      file,
   })
}

/// テキストフィールドを読み取る
async fn text_field(
   field_name: &str,
   field: axum::extract::multipart::Field<'_>,
) -> Result<String, ApiError> {
   field
      .text()
      .await
      .map_err(|e| ApiError::BadRequest(format!("{field_name} の読み取りに失敗しました: {e}")))
}

/// 数値フィールドを読み取る
async fn parse_i64_field(
   field_name: &str,
   field: axum::extract::multipart::Field<'_>,
) -> Result<i64, ApiError> {
   let text = text_field(field_name, field).await?;
   text
      .parse::<i64>()
      .map_err(|_| ApiError::BadRequest(format!("{field_name} は数値である必要があります")))
}

fn missing_field(field_name: &str) -> ApiError {
   ApiError::BadRequest(format!("{field_name} は必須です"))
}
