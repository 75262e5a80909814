//! # プロジェクト API 統合テスト
//!
//! 認証ミドルウェアを含むルーターをスタブリポジトリと oneshot で駆動し、
//! 所有権ゲート・ページング・ファイルダウンロード・作成フローを検証する。

use std::{
   collections::HashMap,
   sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
   Router,
   body::Body,
   http::{Method, Request, StatusCode, header},
   middleware::from_fn_with_state,
   routing::{get, post},
};
use botforge_api::{
   client::llm::{CreateBotResponse, LlmClient, LlmServiceError},
   handler::{
      ProjectState,
      check_project_access,
      count_projects,
      create_project,
      get_project_file,
      list_projects,
   },
   middleware::{AuthnState, attach_auth_state},
   usecase::ProjectUseCaseImpl,
};
use botforge_domain::{
   base_model::{BaseModel, BaseModelId},
   plan::{Plan, SubscriptionLevel},
   project::{NewProject, Project, ProjectId},
   user::UserId,
   value_objects::{MimeType, ProjectName, Prompt, SystemName},
};
use botforge_infra::{
   AuthClaims,
   HmacTokenDecoder,
   InfraError,
   repository::{BaseModelRepository, PlanRepository, ProjectRepository},
};
use tower::ServiceExt;

const TEST_SECRET: &[u8] = b"integration-test-secret";

// ===== スタブリポジトリ =====

#[derive(Clone, Default)]
struct StubProjectRepository {
   projects:   Arc<Mutex<Vec<Project>>>,
   data_lines: Arc<Mutex<HashMap<i64, Vec<String>>>>,
   inserted:   Arc<Mutex<Vec<NewProject>>>,
}

impl StubProjectRepository {
   fn with_project(self, project: Project) -> Self {
      self.projects.lock().unwrap().push(project);
      self
   }

   fn with_data_lines(self, project_id: i64, lines: Vec<String>) -> Self {
      self.data_lines.lock().unwrap().insert(project_id, lines);
      self
   }
}

#[async_trait]
impl ProjectRepository for StubProjectRepository {
   async fn count_by_owner(&self, user_id: UserId) -> Result<i64, InfraError> {
      Ok(self
         .projects
         .lock()
         .unwrap()
         .iter()
         .filter(|p| p.user_id() == user_id)
         .count() as i64)
   }

   async fn find_by_owner(
      &self,
      user_id: UserId,
      offset: i64,
      limit: i64,
   ) -> Result<Vec<Project>, InfraError> {
      Ok(self
         .projects
         .lock()
         .unwrap()
         .iter()
         .filter(|p| p.user_id() == user_id)
         .skip(offset as usize)
         .take(limit as usize)
         .cloned()
         .collect())
   }

   async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, InfraError> {
      Ok(self
         .projects
         .lock()
         .unwrap()
         .iter()
         .find(|p| p.id() == id)
         .cloned())
   }

   async fn insert(&self, new_project: &NewProject) -> Result<ProjectId, InfraError> {
      let mut inserted = self.inserted.lock().unwrap();
      inserted.push(new_project.clone());
      Ok(ProjectId::from_i64(inserted.len() as i64))
   }

   async fn data_lines(&self, id: ProjectId) -> Result<Vec<String>, InfraError> {
      Ok(self
         .data_lines
         .lock()
         .unwrap()
         .get(&id.as_i64())
         .cloned()
         .unwrap_or_default())
   }

   async fn count_all(&self) -> Result<i64, InfraError> {
      Ok(self.projects.lock().unwrap().len() as i64)
   }
}

#[derive(Clone, Default)]
struct StubPlanRepository {
   levels: Arc<Mutex<HashMap<i64, SubscriptionLevel>>>,
}

impl StubPlanRepository {
   fn with_level(self, user_id: i64, level: SubscriptionLevel) -> Self {
      self.levels.lock().unwrap().insert(user_id, level);
      self
   }
}

#[async_trait]
impl PlanRepository for StubPlanRepository {
   async fn upsert_limit(&self, _plan: &Plan) -> Result<(), InfraError> {
      Ok(())
   }

   async fn assign_level(
      &self,
      user_id: UserId,
      level: SubscriptionLevel,
   ) -> Result<(), InfraError> {
      self.levels.lock().unwrap().insert(user_id.as_i64(), level);
      Ok(())
   }

   async fn subscription_level(
      &self,
      user_id: UserId,
   ) -> Result<Option<SubscriptionLevel>, InfraError> {
      Ok(self.levels.lock().unwrap().get(&user_id.as_i64()).copied())
   }

   async fn count_users_by_level(&self) -> Result<Vec<(SubscriptionLevel, i64)>, InfraError> {
      Ok(Vec::new())
   }
}

#[derive(Clone, Default)]
struct StubBaseModelRepository {
   models: Arc<Mutex<HashMap<i64, BaseModel>>>,
}

impl StubBaseModelRepository {
   fn with_model(self, model: BaseModel) -> Self {
      self.models.lock().unwrap().insert(model.id().as_i64(), model);
      self
   }
}

#[async_trait]
impl BaseModelRepository for StubBaseModelRepository {
   async fn find_by_id(&self, id: BaseModelId) -> Result<Option<BaseModel>, InfraError> {
      Ok(self.models.lock().unwrap().get(&id.as_i64()).cloned())
   }
}

/// プロビジョニング呼び出しを記録するスタブ LlmClient
#[derive(Clone, Default)]
struct StubLlmClient {
   calls: Arc<Mutex<Vec<(String, String, String)>>>,
}

#[async_trait]
impl LlmClient for StubLlmClient {
   async fn create_bot(
      &self,
      name: &ProjectName,
      prompt: &Prompt,
      base_model: &BaseModel,
   ) -> Result<CreateBotResponse, LlmServiceError> {
      self.calls.lock().unwrap().push((
         name.as_str().to_string(),
         prompt.as_str().to_string(),
         base_model.name().to_string(),
      ));
      Ok(CreateBotResponse {
         bot_id: "bot-001".to_string(),
      })
   }
}

// ===== テストヘルパー =====

fn create_test_app(
   project_repo: StubProjectRepository,
   base_model_repo: StubBaseModelRepository,
   plan_repo: StubPlanRepository,
   llm_client: StubLlmClient,
) -> Router {
   let state = Arc::new(ProjectState {
      usecase: ProjectUseCaseImpl::new(project_repo, base_model_repo, plan_repo, llm_client),
   });
   let authn = AuthnState {
      decoder: Arc::new(HmacTokenDecoder::new(TEST_SECRET)),
   };

   Router::new()
      .route(
         "/project/count",
         get(count_projects::<
            StubProjectRepository,
            StubBaseModelRepository,
            StubPlanRepository,
            StubLlmClient,
         >),
      )
      .route(
         "/project/all",
         get(list_projects::<
            StubProjectRepository,
            StubBaseModelRepository,
            StubPlanRepository,
            StubLlmClient,
         >),
      )
      .route(
         "/project/file",
         get(get_project_file::<
            StubProjectRepository,
            StubBaseModelRepository,
            StubPlanRepository,
            StubLlmClient,
         >),
      )
      .route(
         "/project/access",
         get(check_project_access::<
            StubProjectRepository,
            StubBaseModelRepository,
            StubPlanRepository,
            StubLlmClient,
         >),
      )
      .route(
         "/project/new",
         post(create_project::<
            StubProjectRepository,
            StubBaseModelRepository,
            StubPlanRepository,
            StubLlmClient,
         >),
      )
      .with_state(state)
      .layer(from_fn_with_state(authn, attach_auth_state))
}

fn token_for(user_id: i64) -> String {
   HmacTokenDecoder::new(TEST_SECRET)
      .issue(&AuthClaims {
         user_id,
         exp: None,
      })
      .unwrap()
}

fn create_project_entity(id: i64, user_id: i64, name: &str) -> Project {
   Project::from_db(
      ProjectId::from_i64(id),
      UserId::from_i64(user_id),
      ProjectName::new(name).unwrap(),
      SystemName::new("support_bot").unwrap(),
      MimeType::new("text/plain").unwrap(),
      BaseModelId::from_i64(3),
      Prompt::new("あなたは丁寧なサポート担当です。").unwrap(),
      chrono::Utc::now(),
   )
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
   let mut builder = Request::builder().method(Method::GET).uri(uri);
   if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
   }
   builder.body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
   let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
   serde_json::from_slice(&bytes).unwrap()
}

async fn read_text(response: axum::response::Response) -> String {
   let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
   String::from_utf8(bytes.to_vec()).unwrap()
}

const BOUNDARY: &str = "botforge-test-boundary";

/// multipart/form-data 本文を組み立てる
fn multipart_body(fields: &[(&str, &str)], file: &[u8]) -> Body {
   let mut body = String::new();
   for (name, value) in fields {
      body.push_str(&format!(
         "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
      ));
   }
   body.push_str(&format!(
      "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
       filename=\"data.txt\"\r\nContent-Type: text/plain\r\n\r\n"
   ));
   body.push_str(&String::from_utf8_lossy(file));
   body.push_str(&format!("\r\n--{BOUNDARY}--\r\n"));
   Body::from(body)
}

fn new_project_fields<'a>(user_id: &'a str) -> Vec<(&'a str, &'a str)> {
   vec![
      ("user_id", user_id),
      ("name", "サポート Bot"),
      ("system_name", "support_bot"),
      ("mimetype", "text/plain"),
      ("base_model_id", "3"),
      ("prompt", "あなたは丁寧なサポート担当です。"),
   ]
}

fn multipart_request(uri: &str, token: &str, body: Body) -> Request<Body> {
   Request::builder()
      .method(Method::POST)
      .uri(uri)
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .header(
         header::CONTENT_TYPE,
         format!("multipart/form-data; boundary={BOUNDARY}"),
      )
      .body(body)
      .unwrap()
}

// ===== 認証ゲートのテスト =====

#[tokio::test]
async fn test_トークンなしでは401本文が返る() {
   // Given
   let sut = create_test_app(
      StubProjectRepository::default().with_project(create_project_entity(1, 42, "pj1")),
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      StubLlmClient::default(),
   );

   for uri in [
      "/project/count",
      "/project/all",
      "/project/file?project_id=1",
      "/project/access?project_id=1",
   ] {
      // When
      let response = sut.clone().oneshot(get_request(uri, None)).await.unwrap();

      // Then: HTTP は 200、本文が 401 を運ぶ
      assert_eq!(response.status(), StatusCode::OK, "uri: {uri}");
      assert_eq!(
         read_json(response).await,
         serde_json::json!({ "status": 401 }),
         "uri: {uri}"
      );
   }
}

#[tokio::test]
async fn test_不正なトークンではプロジェクトが作成されない() {
   // Given
   let project_repo = StubProjectRepository::default();
   let llm_client = StubLlmClient::default();
   let sut = create_test_app(
      project_repo.clone(),
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      llm_client.clone(),
   );

   let request = multipart_request(
      "/project/new",
      "invalid-token",
      multipart_body(&new_project_fields("42"), b"line one"),
   );

   // When
   let response = sut.oneshot(request).await.unwrap();

   // Then: 保存もプロビジョニングも行われない
   assert_eq!(response.status(), StatusCode::OK);
   assert_eq!(read_json(response).await, serde_json::json!({ "status": 401 }));
   assert!(project_repo.inserted.lock().unwrap().is_empty());
   assert!(llm_client.calls.lock().unwrap().is_empty());
}

// ===== /project/count のテスト =====

#[tokio::test]
async fn test_countは所有プロジェクト数を返す() {
   // Given
   let sut = create_test_app(
      StubProjectRepository::default()
         .with_project(create_project_entity(1, 42, "pj1"))
         .with_project(create_project_entity(2, 42, "pj2"))
         .with_project(create_project_entity(3, 99, "pj3")),
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      StubLlmClient::default(),
   );

   // When
   let response = sut
      .oneshot(get_request("/project/count", Some(&token_for(42))))
      .await
      .unwrap();

   // Then
   assert_eq!(response.status(), StatusCode::OK);
   assert_eq!(
      read_json(response).await,
      serde_json::json!({ "user_id": 42, "object": "projects", "count": 2 })
   );
}

// ===== /project/all のテスト =====

#[tokio::test]
async fn test_allはlimit10で最大10件を格納順で返す() {
   // Given: 12 件所有
   let mut project_repo = StubProjectRepository::default();
   for i in 1..=12 {
      project_repo = project_repo.with_project(create_project_entity(i, 42, &format!("pj{i}")));
   }
   let sut = create_test_app(
      project_repo,
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      StubLlmClient::default(),
   );

   // When
   let response = sut
      .oneshot(get_request(
         "/project/all?offset=0&limit=10",
         Some(&token_for(42)),
      ))
      .await
      .unwrap();

   // Then: 最大 10 件、ID 昇順
   assert_eq!(response.status(), StatusCode::OK);
   let body = read_json(response).await;
   let items = body.as_array().unwrap();
   assert_eq!(items.len(), 10);
   let ids: Vec<i64> = items.iter().map(|p| p["id"].as_i64().unwrap()).collect();
   assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_allはoffsetから他人のプロジェクトを除いて返す() {
   // Given
   let sut = create_test_app(
      StubProjectRepository::default()
         .with_project(create_project_entity(1, 42, "pj1"))
         .with_project(create_project_entity(2, 99, "other"))
         .with_project(create_project_entity(3, 42, "pj3"))
         .with_project(create_project_entity(4, 42, "pj4")),
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      StubLlmClient::default(),
   );

   // When
   let response = sut
      .oneshot(get_request(
         "/project/all?offset=1&limit=10",
         Some(&token_for(42)),
      ))
      .await
      .unwrap();

   // Then: 自分の 2 件目以降のみ
   let body = read_json(response).await;
   let ids: Vec<i64> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|p| p["id"].as_i64().unwrap())
      .collect();
   assert_eq!(ids, vec![3, 4]);
}

// ===== /project/file のテスト =====

#[tokio::test]
async fn test_fileは所有者に添付ファイルとして本文を返す() {
   // Given
   let sut = create_test_app(
      StubProjectRepository::default()
         .with_project(create_project_entity(1, 42, "pj1"))
         .with_data_lines(1, vec!["line one".to_string(), "line two".to_string()]),
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      StubLlmClient::default(),
   );

   // When
   let response = sut
      .oneshot(get_request(
         "/project/file?project_id=1",
         Some(&token_for(42)),
      ))
      .await
      .unwrap();

   // Then
   assert_eq!(response.status(), StatusCode::OK);
   assert_eq!(
      response
         .headers()
         .get(header::CONTENT_DISPOSITION)
         .unwrap()
         .to_str()
         .unwrap(),
      "attachment; filename=\"pj1.txt\""
   );
   assert_eq!(read_text(response).await, "line one\nline two");
}

#[tokio::test]
async fn test_fileは所有者以外に401本文を返す() {
   // Given
   let sut = create_test_app(
      StubProjectRepository::default()
         .with_project(create_project_entity(1, 42, "pj1"))
         .with_data_lines(1, vec!["secret".to_string()]),
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      StubLlmClient::default(),
   );

   // When: 別ユーザーのトークンでアクセス
   let response = sut
      .oneshot(get_request(
         "/project/file?project_id=1",
         Some(&token_for(99)),
      ))
      .await
      .unwrap();

   // Then: 本文は開示されない
   assert_eq!(response.status(), StatusCode::OK);
   assert_eq!(read_json(response).await, serde_json::json!({ "status": 401 }));
}

#[tokio::test]
async fn test_fileは存在しないプロジェクトに404を返す() {
   // Given
   let sut = create_test_app(
      StubProjectRepository::default(),
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      StubLlmClient::default(),
   );

   // When
   let response = sut
      .oneshot(get_request(
         "/project/file?project_id=999",
         Some(&token_for(42)),
      ))
      .await
      .unwrap();

   // Then
   assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ===== /project/access のテスト =====

#[tokio::test]
async fn test_accessは所有者かつadvancedのみ200を返す() {
   // Given
   let project_repo = StubProjectRepository::default()
      .with_project(create_project_entity(1, 42, "pj1"))
      .with_project(create_project_entity(2, 99, "other"));
   let plan_repo = StubPlanRepository::default()
      .with_level(42, SubscriptionLevel::Advanced)
      .with_level(99, SubscriptionLevel::Standard);
   let sut = create_test_app(
      project_repo,
      StubBaseModelRepository::default(),
      plan_repo,
      StubLlmClient::default(),
   );

   // When/Then: 所有者かつ advanced
   let response = sut
      .clone()
      .oneshot(get_request(
         "/project/access?project_id=1",
         Some(&token_for(42)),
      ))
      .await
      .unwrap();
   assert_eq!(read_json(response).await, serde_json::json!({ "status": 200 }));

   // When/Then: 所有者だが階層不足
   let response = sut
      .clone()
      .oneshot(get_request(
         "/project/access?project_id=2",
         Some(&token_for(99)),
      ))
      .await
      .unwrap();
   assert_eq!(read_json(response).await, serde_json::json!({ "status": 401 }));

   // When/Then: advanced だが所有者でない
   let response = sut
      .oneshot(get_request(
         "/project/access?project_id=2",
         Some(&token_for(42)),
      ))
      .await
      .unwrap();
   assert_eq!(read_json(response).await, serde_json::json!({ "status": 401 }));
}

// ===== /project/new のテスト =====

#[tokio::test]
async fn test_newは保存とプロビジョニングを1回ずつ行い201を返す() {
   // Given
   let project_repo = StubProjectRepository::default();
   let base_model_repo = StubBaseModelRepository::default().with_model(BaseModel::from_db(
      BaseModelId::from_i64(3),
      "gpt-4o-mini".to_string(),
   ));
   let llm_client = StubLlmClient::default();
   let sut = create_test_app(
      project_repo.clone(),
      base_model_repo,
      StubPlanRepository::default(),
      llm_client.clone(),
   );

   let request = multipart_request(
      "/project/new",
      &token_for(42),
      multipart_body(&new_project_fields("42"), b"line one\nline two"),
   );

   // When
   let response = sut.oneshot(request).await.unwrap();

   // Then
   assert_eq!(response.status(), StatusCode::CREATED);
   assert_eq!(read_json(response).await, serde_json::json!({ "status": 201 }));

   // 保存はちょうど 1 回、ファイルのバイト列込み
   let inserted = project_repo.inserted.lock().unwrap();
   assert_eq!(inserted.len(), 1);
   assert_eq!(inserted[0].user_id, UserId::from_i64(42));
   assert_eq!(inserted[0].file, b"line one\nline two".to_vec());

   // プロビジョニングはちょうど 1 回、name / prompt が一致
   let calls = llm_client.calls.lock().unwrap();
   assert_eq!(calls.len(), 1);
   assert_eq!(
      calls[0],
      (
         "サポート Bot".to_string(),
         "あなたは丁寧なサポート担当です。".to_string(),
         "gpt-4o-mini".to_string(),
      )
   );
}

#[tokio::test]
async fn test_newは申告所有者が不一致なら401本文を返す() {
   // Given
   let project_repo = StubProjectRepository::default();
   let llm_client = StubLlmClient::default();
   let sut = create_test_app(
      project_repo.clone(),
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      llm_client.clone(),
   );

   // When: セッションユーザー 99 が user_id=42 を申告
   let request = multipart_request(
      "/project/new",
      &token_for(99),
      multipart_body(&new_project_fields("42"), b"line one"),
   );
   let response = sut.oneshot(request).await.unwrap();

   // Then: 保存もプロビジョニングも行われない
   assert_eq!(response.status(), StatusCode::OK);
   assert_eq!(read_json(response).await, serde_json::json!({ "status": 401 }));
   assert!(project_repo.inserted.lock().unwrap().is_empty());
   assert!(llm_client.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_newは必須フィールド欠落で400を返す() {
   // Given
   let sut = create_test_app(
      StubProjectRepository::default(),
      StubBaseModelRepository::default(),
      StubPlanRepository::default(),
      StubLlmClient::default(),
   );

   // When: prompt を欠いた multipart
   let fields = vec![
      ("user_id", "42"),
      ("name", "サポート Bot"),
      ("system_name", "support_bot"),
      ("mimetype", "text/plain"),
      ("base_model_id", "3"),
   ];
   let request = multipart_request(
      "/project/new",
      &token_for(42),
      multipart_body(&fields, b"line one"),
   );
   let response = sut.oneshot(request).await.unwrap();

   // Then
   assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
