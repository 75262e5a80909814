//! # 認証トークンの検証
//!
//! HMAC-SHA256 署名付きトークンを検証し、認証状態（[`AuthState`]）へ
//! 変換するコンポーネント。
//!
//! ## トークン形式
//!
//! ```text
//! base64url(claims_json) "." base64url(hmac_sha256(claims_json))
//! ```
//!
//! claims は `{"user_id": 42, "exp": 1754300000}` 形式の JSON。
//! `exp` は UNIX 秒の有効期限で、省略可能。
//!
//! ## 設計方針
//!
//! - **失敗もデータ**: 検証失敗は `Err` ではなく
//!   [`AuthState::Denied`] として返す。ハンドラはステータスコードを
//!   そのままレスポンス本文へ載せる
//! - **発行は管轄外**: トークンの発行はアカウント基盤側の責務。
//!   [`HmacTokenDecoder::issue`] は発行側と同じ形式を生成する
//!   対向実装で、主にテストと運用ツールから使用する

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use botforge_domain::{auth::AuthState, user::UserId};

use crate::error::InfraError;

type HmacSha256 = Hmac<Sha256>;

/// トークンに埋め込まれるクレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
   /// 検証対象のユーザー ID
   pub user_id: i64,
   /// 有効期限（UNIX 秒）。省略時は無期限
   #[serde(skip_serializing_if = "Option::is_none")]
   pub exp:     Option<i64>,
}

/// トークン検証トレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
pub trait TokenDecoder: Send + Sync {
   /// トークン文字列を検証し、認証状態を返す
   ///
   /// 形式不正・署名不一致・期限切れはすべて
   /// [`AuthState::unauthorized`] になる。
   fn decode(&self, token: &str) -> AuthState;
}

/// HMAC-SHA256 による TokenDecoder 実装
#[derive(Clone)]
pub struct HmacTokenDecoder {
   mac: HmacSha256,
}

impl HmacTokenDecoder {
   /// 共有シークレットから検証器を作成する
   pub fn new(secret: &[u8]) -> Self {
      // HMAC は任意長の鍵を受け付けるため new_from_slice は失敗しない
      let mac = HmacSha256::new_from_slice(secret).expect("HMAC 鍵は任意長");
      Self { mac }
   }

   /// クレームに署名してトークン文字列を生成する
   ///
   /// 発行側（アカウント基盤）と同じ形式を生成する対向実装。
   pub fn issue(&self, claims: &AuthClaims) -> Result<String, InfraError> {
      let payload = serde_json::to_vec(claims)?;

      let mut mac = self.mac.clone();
      mac.update(&payload);
      let signature = mac.finalize().into_bytes();

      Ok(format!(
         "{}.{}",
         URL_SAFE_NO_PAD.encode(&payload),
         URL_SAFE_NO_PAD.encode(signature)
      ))
   }
}

impl TokenDecoder for HmacTokenDecoder {
   fn decode(&self, token: &str) -> AuthState {
      let Some((payload_b64, signature_b64)) = token.split_once('.') else {
         return AuthState::unauthorized();
      };

      let Ok(payload) = URL_SAFE_NO_PAD.decode(payload_b64) else {
         return AuthState::unauthorized();
      };
      let Ok(signature) = URL_SAFE_NO_PAD.decode(signature_b64) else {
         return AuthState::unauthorized();
      };

      // 署名検証（verify_slice は定数時間比較）
      let mut mac = self.mac.clone();
      mac.update(&payload);
      if mac.verify_slice(&signature).is_err() {
         return AuthState::unauthorized();
      }

      let Ok(claims) = serde_json::from_slice::<AuthClaims>(&payload) else {
         return AuthState::unauthorized();
      };

      // 有効期限チェック
      if let Some(exp) = claims.exp {
         if exp < chrono::Utc::now().timestamp() {
            return AuthState::unauthorized();
         }
      }

      AuthState::Authenticated(UserId::from_i64(claims.user_id))
   }
}
