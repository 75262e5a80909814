//! # BotForge API サーバー
//!
//! 管理者 API とプロジェクト API を公開する Web バックエンド。
//!
//! ## 役割
//!
//! - **管理者 API**: 管理 Bot からのプラン上限変更・階層割り当て・統計取得
//! - **プロジェクト API**: Web フロントエンドからのプロジェクト作成・参照
//! - **Bot プロビジョニング**: プロジェクト作成時に Bot 生成サービスを呼び出す
//!
//! ## 認証
//!
//! ```text
//! 管理者 API      : ?token= クエリパラメータをハンドラが直接検証
//! プロジェクト API : Authorization: Bearer ヘッダをミドルウェアが検証し、
//!                    認証状態をリクエスト拡張としてハンドラへ引き渡す
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `API_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `API_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `TOKEN_SECRET` | **Yes** | トークン検証用の共有シークレット |
//! | `LLM_BASE_URL` | **Yes** | Bot 生成サービスのベース URL |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境
//! cargo run -p botforge-api
//!
//! # 本番環境
//! API_PORT=3000 DATABASE_URL=postgres://... cargo run -p botforge-api --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use axum::{
   Router,
   middleware::from_fn_with_state,
   routing::{get, post},
};
use botforge_api::{
   client::LlmClientImpl,
   config::ApiConfig,
   handler::{
      AdminState,
      ProjectState,
      change_limits,
      check_project_access,
      count_projects,
      create_project,
      get_project_file,
      give_access,
      health_check,
      list_projects,
      view_stats,
   },
   middleware::{AuthnState, attach_auth_state},
   usecase::{AdminUseCaseImpl, ProjectUseCaseImpl},
};
use botforge_infra::{
   HmacTokenDecoder,
   TokenDecoder,
   db,
   repository::{
      PostgresBaseModelRepository,
      PostgresPlanRepository,
      PostgresProjectRepository,
   },
};
use botforge_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// API サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   // トレーシング初期化
   init_tracing(TracingConfig::from_env("botforge-api"));

   // 設定読み込み
   let config = ApiConfig::from_env().expect("設定の読み込みに失敗しました");

   tracing::info!(
      "API サーバーを起動します: {}:{}",
      config.host,
      config.port
   );

   // データベース接続プールを作成し、マイグレーションを適用
   let pool = db::create_pool(&config.database_url)
      .await
      .expect("データベース接続に失敗しました");
   db::run_migrations(&pool)
      .await
      .expect("マイグレーションの適用に失敗しました");
   tracing::info!("データベースに接続しました");

   // トークン検証器
   let decoder: Arc<dyn TokenDecoder> =
      Arc::new(HmacTokenDecoder::new(config.token_secret.as_bytes()));

   // 管理者 API の依存コンポーネント
   let admin_plan_repo = PostgresPlanRepository::new(pool.clone());
   let admin_project_repo = PostgresProjectRepository::new(pool.clone());
   let admin_state = Arc::new(AdminState {
      decoder: decoder.clone(),
      usecase: AdminUseCaseImpl::new(admin_plan_repo, admin_project_repo),
   });

   // プロジェクト API の依存コンポーネント
   let project_repo = PostgresProjectRepository::new(pool.clone());
   let base_model_repo = PostgresBaseModelRepository::new(pool.clone());
   let plan_repo = PostgresPlanRepository::new(pool.clone());
   let llm_client = LlmClientImpl::new(&config.llm_base_url);
   let project_state = Arc::new(ProjectState {
      usecase: ProjectUseCaseImpl::new(project_repo, base_model_repo, plan_repo, llm_client),
   });

   // 認証ミドルウェアの状態
   let authn = AuthnState { decoder };

   // プロジェクト API（認証ミドルウェア付き）
   let project_routes = Router::new()
      .route(
         "/project/count",
         get(count_projects::<
            PostgresProjectRepository,
            PostgresBaseModelRepository,
            PostgresPlanRepository,
            LlmClientImpl,
         >),
      )
      .route(
         "/project/all",
         get(list_projects::<
            PostgresProjectRepository,
            PostgresBaseModelRepository,
            PostgresPlanRepository,
            LlmClientImpl,
         >),
      )
      .route(
         "/project/file",
         get(get_project_file::<
            PostgresProjectRepository,
            PostgresBaseModelRepository,
            PostgresPlanRepository,
            LlmClientImpl,
         >),
      )
      .route(
         "/project/access",
         get(check_project_access::<
            PostgresProjectRepository,
            PostgresBaseModelRepository,
            PostgresPlanRepository,
            LlmClientImpl,
         >),
      )
      .route(
         "/project/new",
         post(create_project::<
            PostgresProjectRepository,
            PostgresBaseModelRepository,
            PostgresPlanRepository,
            LlmClientImpl,
         >),
      )
      .with_state(project_state)
      .layer(from_fn_with_state(authn, attach_auth_state));

   // ルーター構築
   let app = Router::new()
      .route("/health", get(health_check))
      // 管理者 API
      .route(
         "/admin/limits",
         post(change_limits::<PostgresPlanRepository, PostgresProjectRepository>),
      )
      .route(
         "/admin/access",
         post(give_access::<PostgresPlanRepository, PostgresProjectRepository>),
      )
      .route(
         "/admin/stats",
         get(view_stats::<PostgresPlanRepository, PostgresProjectRepository>),
      )
      .with_state(admin_state)
      // プロジェクト API
      .merge(project_routes)
      .layer(TraceLayer::new_for_http());

   // サーバー起動
   let addr: SocketAddr = format!("{}:{}", config.host, config.port)
      .parse()
      .expect("アドレスのパースに失敗しました");

   let listener = TcpListener::bind(addr).await?;
   tracing::info!("API サーバーが起動しました: {}", addr);

   axum::serve(listener, app).await?;

   Ok(())
}
