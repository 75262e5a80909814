//! # 認証ミドルウェア
//!
//! Bearer トークンを検証し、認証状態（[`AuthState`]）をリクエスト拡張として
//! ハンドラへ引き渡す。
//!
//! ## 設計方針
//!
//! このミドルウェアはリクエストを**拒否しない**。トークンが無い・不正な
//! 場合も `AuthState::Denied` を拡張に積んでハンドラへ進める。
//! 認可失敗をレスポンス本文として返すのは各ハンドラの責務。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! let authn = AuthnState { decoder: decoder.clone() };
//!
//! Router::new()
//!     .route("/project/count", get(count_projects))
//!     .layer(from_fn_with_state(authn, attach_auth_state))
//! ```

use std::sync::Arc;

use axum::{
   body::Body,
   extract::State,
   http::Request,
   middleware::Next,
   response::Response,
};
use axum_extra::{
   TypedHeader,
   headers::{Authorization, authorization::Bearer},
};

use botforge_domain::auth::AuthState;
use botforge_infra::TokenDecoder;

/// 認証ミドルウェアの状態
#[derive(Clone)]
pub struct AuthnState {
   pub decoder: Arc<dyn TokenDecoder>,
}

/// 認証ミドルウェア
///
/// `Authorization: Bearer` ヘッダからトークンを取り出して検証し、
/// 結果の [`AuthState`] をリクエスト拡張に挿入する。
/// ヘッダが無い場合は `Denied(401)` を挿入する。
pub async fn attach_auth_state(
   State(state): State<AuthnState>,
   bearer: Option<TypedHeader<Authorization<Bearer>>>,
   mut request: Request<Body>,
   next: Next,
) -> Response {
   let auth = match &bearer {
      Some(TypedHeader(header)) => state.decoder.decode(header.token()),
      None => AuthState::unauthorized(),
   };

   request.extensions_mut().insert(auth);
   next.run(request).await
}

#[cfg(test)]
mod tests {
   use std::sync::Arc;

   use axum::{
      Extension,
      Router,
      body::Body,
      http::{Method, Request, StatusCode},
      middleware::from_fn_with_state,
      response::IntoResponse,
      routing::get,
   };
   use botforge_domain::auth::AuthState;
   use botforge_infra::{AuthClaims, HmacTokenDecoder};
   use tower::ServiceExt;

   use super::*;

   const TEST_SECRET: &[u8] = b"test-secret";

   /// 拡張に積まれた認証状態をそのまま検査できるダミーハンドラ
   async fn dummy_handler(Extension(auth): Extension<AuthState>) -> impl IntoResponse {
      match auth {
         AuthState::Authenticated(user_id) => format!("user:{}", user_id.as_i64()),
         AuthState::Denied(code) => format!("denied:{}", code),
      }
   }

   fn create_test_app() -> Router {
      let authn = AuthnState {
         decoder: Arc::new(HmacTokenDecoder::new(TEST_SECRET)),
      };

      Router::new()
         .route("/test", get(dummy_handler))
         .layer(from_fn_with_state(authn, attach_auth_state))
   }

   async fn body_string(response: axum::response::Response) -> String {
      let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
         .await
         .unwrap();
      String::from_utf8(bytes.to_vec()).unwrap()
   }

   #[tokio::test]
   async fn test_正しいトークンは認証済み状態が積まれる() {
      // Given
      let sut = create_test_app();
      let token = HmacTokenDecoder::new(TEST_SECRET)
         .issue(&AuthClaims {
            user_id: 42,
            exp:     None,
         })
         .unwrap();

      let request = Request::builder()
         .method(Method::GET)
         .uri("/test")
         .header("Authorization", format!("Bearer {token}"))
         .body(Body::empty())
         .unwrap();

      // When
      let response = sut.oneshot(request).await.unwrap();

      // Then
      assert_eq!(response.status(), StatusCode::OK);
      assert_eq!(body_string(response).await, "user:42");
   }

   #[tokio::test]
   async fn test_ヘッダなしは拒否状態が積まれる() {
      // Given
      let sut = create_test_app();

      let request = Request::builder()
         .method(Method::GET)
         .uri("/test")
         .body(Body::empty())
         .unwrap();

      // When
      let response = sut.oneshot(request).await.unwrap();

      // Then: ミドルウェアは拒否せず、ハンドラまで到達する
      assert_eq!(response.status(), StatusCode::OK);
      assert_eq!(body_string(response).await, "denied:401");
   }

   #[tokio::test]
   async fn test_不正なトークンは拒否状態が積まれる() {
      // Given
      let sut = create_test_app();

      let request = Request::builder()
         .method(Method::GET)
         .uri("/test")
         .header("Authorization", "Bearer not-a-token")
         .body(Body::empty())
         .unwrap();

      // When
      let response = sut.oneshot(request).await.unwrap();

      // Then
      assert_eq!(response.status(), StatusCode::OK);
      assert_eq!(body_string(response).await, "denied:401");
   }
}
