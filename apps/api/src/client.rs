//! # 外部サービスクライアント
//!
//! API サーバーから外部サービスへの通信を担当するクライアントを定義する。

pub mod llm;

pub use llm::{LlmClient, LlmClientImpl, LlmServiceError};
