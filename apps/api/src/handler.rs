//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケース層に委譲
//! - 認可の失敗は HTTP エラーではなく `{ "status": N }` 本文
//!   （[`status_response`]）として返す

pub mod admin;
pub mod health;
pub mod project;

pub use admin::{AdminState, change_limits, give_access, view_stats};
pub use health::health_check;
pub use project::{
   ProjectState,
   check_project_access,
   count_projects,
   create_project,
   get_project_file,
   list_projects,
};

use axum::{
   Json,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use botforge_shared::StatusResponse;

/// 認可結果をレスポンス本文として返す
///
/// HTTP ステータスは常に 200。呼び出し側は本文の `status` を検査する。
pub(crate) fn status_response(code: u16) -> Response {
   (StatusCode::OK, Json(StatusResponse::new(code))).into_response()
}
