//! # API サーバー設定
//!
//! 環境変数から API サーバーの設定を読み込む。

use std::env;

/// API サーバーの設定
#[derive(Debug, Clone)]
pub struct ApiConfig {
   /// バインドアドレス
   pub host:         String,
   /// ポート番号
   pub port:         u16,
   /// データベース接続 URL
   pub database_url: String,
   /// トークン検証用の共有シークレット
   pub token_secret: String,
   /// Bot 生成サービスのベース URL
   pub llm_base_url: String,
}

impl ApiConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, env::VarError> {
      Ok(Self {
         host:         env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
         port:         env::var("API_PORT")
            .expect("API_PORT が設定されていません")
            .parse()
            .expect("API_PORT は有効なポート番号である必要があります"),
         database_url: env::var("DATABASE_URL").expect("DATABASE_URL が設定されていません"),
         token_secret: env::var("TOKEN_SECRET").expect("TOKEN_SECRET が設定されていません"),
         llm_base_url: env::var("LLM_BASE_URL").expect("LLM_BASE_URL が設定されていません"),
      })
   }
}
