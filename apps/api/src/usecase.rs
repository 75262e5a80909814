//! # ユースケース
//!
//! ハンドラから呼び出されるビジネスロジックを定義する。
//!
//! ## 設計方針
//!
//! - ハンドラは薄く保ち、所有権チェックと永続化・外部サービス呼び出しの
//!   順序制御はユースケースに集約する
//! - 認可の失敗は `Err` ではなく明示的な Outcome 列挙型で返す
//!   （認可失敗はレスポンス本文として返す設計のため）

pub mod admin;
pub mod project;

pub use admin::{AdminStats, AdminUseCaseImpl};
pub use project::{
   AccessCheckOutcome,
   CreateProjectOutcome,
   FetchFileOutcome,
   ProjectUseCaseImpl,
};
