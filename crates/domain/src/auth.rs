//! # 認証状態
//!
//! トークン検証の結果を表現する sum 型を定義する。
//!
//! ## 設計方針
//!
//! - **例外ではなくデータ**: 認証失敗は例外として送出せず、
//!   ステータスコードを保持した値としてハンドラまで明示的に伝搬する
//! - **リクエストスコープ**: ミドルウェアがリクエスト到着時に構築し、
//!   ハンドラが消費し、レスポンス送出とともに破棄される
//!
//! 認証に失敗したリクエストへのレスポンスは HTTP エラーではなく、
//! 元のステータスコードを本文に載せた 200 形のペイロードになる。
//! 呼び出し側は HTTP ステータスではなく本文の `status` を検査する。

use crate::user::UserId;

/// レスポンス本文に載せるステータスコード定数
///
/// HTTP のステータスコードと同じ数値を使うが、本文内のデータとして
/// 扱うためドメイン層で定義する。
pub mod status {
    /// 認証済み・操作成功
    pub const OK: u16 = 200;
    /// リソース作成成功
    pub const CREATED: u16 = 201;
    /// 未認証・権限なし
    pub const UNAUTHORIZED: u16 = 401;
}

/// リクエストスコープの認証状態
///
/// トークンの検証結果として、検証済みのユーザー ID か
/// 拒否ステータスコードのどちらかを保持する。
///
/// # 不変条件
///
/// - `Authenticated` はトークン署名の検証に成功した場合のみ構築される
/// - `Denied` のコードがそのままレスポンス本文の `status` になる
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// 認証済み（検証されたユーザー ID を保持）
    Authenticated(UserId),
    /// 拒否（本文に載せるステータスコードを保持）
    Denied(u16),
}

impl AuthState {
    /// 401 で拒否された状態を作成する
    pub fn unauthorized() -> Self {
        Self::Denied(status::UNAUTHORIZED)
    }

    /// 認証済みか判定する
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// 本文に載せるステータスコードを返す
    pub fn status(&self) -> u16 {
        match self {
            Self::Authenticated(_) => status::OK,
            Self::Denied(code) => *code,
        }
    }

    /// 認証済みの場合のみユーザー ID を返す
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Authenticated(user_id) => Some(*user_id),
            Self::Denied(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_認証済み状態はokを返す() {
        let state = AuthState::Authenticated(UserId::from_i64(1));

        assert!(state.is_ok());
        assert_eq!(state.status(), status::OK);
        assert_eq!(state.user_id(), Some(UserId::from_i64(1)));
    }

    #[test]
    fn test_拒否状態は保持したコードを返す() {
        let state = AuthState::Denied(status::UNAUTHORIZED);

        assert!(!state.is_ok());
        assert_eq!(state.status(), status::UNAUTHORIZED);
        assert_eq!(state.user_id(), None);
    }

    #[test]
    fn test_unauthorizedは401で拒否する() {
        assert_eq!(AuthState::unauthorized(), AuthState::Denied(401));
    }
}
