//! # BotForge API ライブラリ
//!
//! API サーバーのハンドラ・ユースケース・ミドルウェアを公開する。
//! テスト用に内部モジュールへのアクセスを提供する。

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod usecase;
