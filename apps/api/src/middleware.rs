//! # ミドルウェア
//!
//! ハンドラのディスパッチ前に適用されるミドルウェアを定義する。

pub mod auth;

pub use auth::{AuthnState, attach_auth_state};
