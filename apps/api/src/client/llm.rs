//! # Bot 生成サービスクライアント
//!
//! API サーバーから Bot 生成サービス（LLM 基盤）への通信を担当する。
//!
//! ## エンドポイント
//!
//! - `POST /bots` - プロジェクト名・プロンプト・ベースモデルを指定して
//!   Bot インスタンスをプロビジョニングする

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use botforge_domain::{
   base_model::BaseModel,
   value_objects::{ProjectName, Prompt},
};

/// Bot 生成サービスクライアントエラー
#[derive(Debug, Clone, Error)]
pub enum LlmServiceError {
   /// リクエストエラー（400）
   #[error("リクエストエラー: {0}")]
   BadRequest(String),

   /// ネットワークエラー
   #[error("ネットワークエラー: {0}")]
   Network(String),

   /// Bot 生成サービスが利用不可（503）
   #[error("Bot 生成サービスが一時的に利用できません")]
   ServiceUnavailable,

   /// 予期しないエラー
   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

impl From<reqwest::Error> for LlmServiceError {
   fn from(err: reqwest::Error) -> Self {
      if err.is_connect() || err.is_timeout() {
         LlmServiceError::ServiceUnavailable
      } else {
         LlmServiceError::Network(err.to_string())
      }
   }
}

// --- リクエスト/レスポンス型 ---

/// Bot プロビジョニングリクエスト
#[derive(Debug, Serialize)]
struct CreateBotRequest<'a> {
   name:       &'a str,
   prompt:     &'a str,
   base_model: &'a str,
}

/// Bot プロビジョニングレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBotResponse {
   pub bot_id: String,
}

/// Bot 生成サービスクライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait LlmClient: Send + Sync {
   /// Bot インスタンスをプロビジョニングする
   ///
   /// Bot 生成サービスの `POST /bots` を呼び出す。
   async fn create_bot(
      &self,
      name: &ProjectName,
      prompt: &Prompt,
      base_model: &BaseModel,
   ) -> Result<CreateBotResponse, LlmServiceError>;
}

/// Bot 生成サービスクライアント実装
pub struct LlmClientImpl {
   base_url: String,
   client:   reqwest::Client,
}

impl LlmClientImpl {
   /// 新しい LlmClient を作成する
   ///
   /// # 引数
   ///
   /// - `base_url`: Bot 生成サービスのベース URL（例: `http://localhost:13100`）
   pub fn new(base_url: &str) -> Self {
      Self {
         base_url: base_url.trim_end_matches('/').to_string(),
         client:   reqwest::Client::new(),
      }
   }
}

#[async_trait]
impl LlmClient for LlmClientImpl {
   async fn create_bot(
      &self,
      name: &ProjectName,
      prompt: &Prompt,
      base_model: &BaseModel,
   ) -> Result<CreateBotResponse, LlmServiceError> {
      let url = format!("{}/bots", self.base_url);
      let request = CreateBotRequest {
         name:       name.as_str(),
         prompt:     prompt.as_str(),
         base_model: base_model.name(),
      };

      let response = self.client.post(&url).json(&request).send().await?;

      match response.status() {
         status if status.is_success() => {
            let body = response.json::<CreateBotResponse>().await?;
            Ok(body)
         }
         reqwest::StatusCode::BAD_REQUEST => {
            let body = response.text().await.unwrap_or_default();
            Err(LlmServiceError::BadRequest(body))
         }
         reqwest::StatusCode::SERVICE_UNAVAILABLE => Err(LlmServiceError::ServiceUnavailable),
         status => {
            let body = response.text().await.unwrap_or_default();
            Err(LlmServiceError::Unexpected(format!(
               "予期しないステータス {}: {}",
               status, body
            )))
         }
      }
   }
}
