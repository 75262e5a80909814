//! # ステータスレスポンス
//!
//! 認証・認可の結果をレスポンス本文として返す `{ "status": N }` 形式を
//! 提供する。
//!
//! 認可の失敗は HTTP エラーとしてではなく、元のステータスコードを
//! 本文に載せた 200 形のペイロードとして返す設計のため、
//! 呼び出し側は HTTP ステータスではなくこの本文を検査する。

use serde::{Deserialize, Serialize};

/// 認証・認可結果の統一レスポンス型
///
/// ## 使用例
///
/// ```
/// use botforge_shared::StatusResponse;
///
/// let response = StatusResponse::new(401);
/// assert_eq!(response.status, 401);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: u16,
}

impl StatusResponse {
    /// 新しい `StatusResponse` を作成する
    pub fn new(status: u16) -> Self {
        Self { status }
    }
}
