//! # API エラー定義
//!
//! API サーバー固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! 認可の失敗はこのエラー型を経由しない点に注意。認可失敗は
//! `{ "status": N }` 形式の 200 レスポンス本文としてハンドラが直接返す
//! （[`botforge_shared::StatusResponse`]）。ここで扱うのはそれ以外の
//! 通常のエラー（入力不正、リソース不在、基盤障害）のみ。

use axum::{
   Json,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::client::llm::LlmServiceError;

/// エラーレスポンス（RFC 7807 Problem Details）
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
   #[serde(rename = "type")]
   pub error_type: String,
   pub title:      String,
   pub status:     u16,
   pub detail:     String,
}

/// API サーバーで発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
   /// リソースが見つからない
   #[error("リソースが見つかりません: {0}")]
   NotFound(String),

   /// 不正なリクエスト
   #[error("不正なリクエスト: {0}")]
   BadRequest(String),

   /// データベースエラー
   #[error("データベースエラー: {0}")]
   Database(#[from] botforge_infra::InfraError),

   /// Bot 生成サービスエラー
   #[error("Bot 生成サービスエラー: {0}")]
   LlmService(#[from] LlmServiceError),
}

impl IntoResponse for ApiError {
   fn into_response(self) -> Response {
      let (status, error_type, title, detail) = match &self {
         ApiError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            "https://botforge.example.com/errors/not-found",
            "Not Found",
            msg.clone(),
         ),
         ApiError::BadRequest(msg) => (
            StatusCode::BAD_REQUEST,
            "https://botforge.example.com/errors/bad-request",
            "Bad Request",
            msg.clone(),
         ),
         ApiError::Database(e) => {
            tracing::error!("データベースエラー: {}", e);
            (
               StatusCode::INTERNAL_SERVER_ERROR,
               "https://botforge.example.com/errors/internal-error",
               "Internal Server Error",
               "内部エラーが発生しました".to_string(),
            )
         }
         ApiError::LlmService(e) => {
            tracing::error!("Bot 生成サービスエラー: {}", e);
            (
               StatusCode::BAD_GATEWAY,
               "https://botforge.example.com/errors/upstream-error",
               "Bad Gateway",
               "Bot 生成サービスの呼び出しに失敗しました".to_string(),
            )
         }
      };

      (
         status,
         Json(ErrorResponse {
            error_type: error_type.to_string(),
            title: title.to_string(),
            status: status.as_u16(),
            detail,
         }),
      )
         .into_response()
   }
}
