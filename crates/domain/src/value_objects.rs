//! # 共通値オブジェクト
//!
//! 複数のエンティティで共有される値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: プリミティブ型をラップし、型安全性を確保
//! - **バリデーション**: 生成時に検証し、不正な値の存在を型レベルで排除
//! - **不変性**: 一度作成したら変更不可
//!
//! ## 含まれる型
//!
//! | 型 | ラップ対象 | 用途 |
//! |---|-----------|------|
//! | [`ProjectName`] | `String` | プロジェクト表示名 |
//! | [`SystemName`] | `String` | Bot の機械可読な識別名 |
//! | [`MimeType`] | `String` | アップロードファイルの MIME タイプ |
//! | [`Prompt`] | `String` | Bot のシステムプロンプト |
//! | [`PlanName`] | `String` | サブスクリプションプラン名 |

use serde::{Deserialize, Serialize};

use crate::DomainError;

// =========================================================================
// ProjectName（プロジェクト表示名）
// =========================================================================

define_validated_string! {
    /// プロジェクト表示名（値オブジェクト）
    ///
    /// ダウンロードファイル名（`<name>.txt`）にもそのまま使われる。
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - 最大 100 文字
    pub struct ProjectName {
        label: "プロジェクト名",
        max_length: 100,
    }
}

// =========================================================================
// Prompt（システムプロンプト）
// =========================================================================

define_validated_string! {
    /// Bot のシステムプロンプト（値オブジェクト）
    ///
    /// プロジェクト作成時に Bot 生成サービスへそのまま渡される。
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - 最大 4000 文字
    pub struct Prompt {
        label: "プロンプト",
        max_length: 4000,
    }
}

// =========================================================================
// PlanName（プラン名）
// =========================================================================

define_validated_string! {
    /// サブスクリプションプラン名（値オブジェクト）
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - 最大 50 文字
    pub struct PlanName {
        label: "プラン名",
        max_length: 50,
    }
}

// =========================================================================
// SystemName（機械可読な識別名）
// =========================================================================

/// Bot の機械可読な識別名（値オブジェクト）
///
/// メッセージング基盤上で Bot を一意に指す名前。
/// 小文字英数字とアンダースコアのみ許容する。
///
/// # バリデーション
///
/// - 空文字列ではない
/// - 最大 64 文字
/// - `[a-z0-9_]` のみ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemName(String);

impl SystemName {
    /// 識別名を作成する
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation("識別名は必須です".to_string()));
        }

        if value.len() > 64 {
            return Err(DomainError::Validation(
                "識別名は 64 文字以内である必要があります".to_string(),
            ));
        }

        if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(DomainError::Validation(
                "識別名に使用できるのは小文字英数字とアンダースコアのみです".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SystemName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =========================================================================
// MimeType（MIME タイプ）
// =========================================================================

/// アップロードファイルの MIME タイプ（値オブジェクト）
///
/// # バリデーション
///
/// - 空文字列ではない
/// - `type/subtype` の形式であること
/// - 最大 255 文字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeType(String);

impl MimeType {
    /// MIME タイプを作成する
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "MIME タイプは必須です".to_string(),
            ));
        }

        // 基本的な構造検証: type/subtype の形式であること
        let Some((main_type, sub_type)) = value.split_once('/') else {
            return Err(DomainError::Validation(
                "MIME タイプの形式が不正です".to_string(),
            ));
        };

        if main_type.is_empty() || sub_type.is_empty() {
            return Err(DomainError::Validation(
                "MIME タイプの形式が不正です".to_string(),
            ));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "MIME タイプは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =========================================================================
// テスト
// =========================================================================
