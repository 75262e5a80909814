//! # BotForge インフラ層
//!
//! データベースアクセスと外部コンポーネント連携の実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: リポジトリとトークン検証はトレイトで抽象化し、
//!   ユースケース層からはトレイト経由で利用する
//! - **PostgreSQL 専用**: sqlx による非同期アクセス
//! - **エラーの可観測性**: すべてのインフラエラーが生成時点の
//!   [`SpanTrace`](tracing_error::SpanTrace) を保持する
//!
//! ## モジュール構成
//!
//! - [`db`] - 接続プールの作成
//! - [`error`] - インフラ層エラー
//! - [`repository`] - リポジトリトレイトと PostgreSQL 実装
//! - [`token`] - 認証トークンの検証

pub mod db;
pub mod error;
pub mod repository;
pub mod token;

pub use error::{InfraError, InfraErrorKind};
pub use token::{AuthClaims, HmacTokenDecoder, TokenDecoder};
