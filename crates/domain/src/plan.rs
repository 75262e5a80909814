//! # サブスクリプションプラン
//!
//! サブスクリプションのプラン（利用上限付きの課金階層）と、
//! ユーザーに割り当てられる階層を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`Plan`] | プラン | プラン名と利用上限の組。管理者がグローバルに更新する |
//! | [`SubscriptionLevel`] | サブスクリプション階層 | ユーザー単位で割り当てられる階層 |

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, value_objects::PlanName};

/// サブスクリプション階層
///
/// ユーザーに割り当てられる課金階層を表現する列挙型。
/// `advanced` のみがプロジェクトの高度なアクセスを許可される。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionLevel {
    /// 無料枠
    Free,
    /// 標準プラン
    Standard,
    /// 上位プラン（高度なアクセスを許可）
    Advanced,
}

impl SubscriptionLevel {
    /// 高度なアクセスが許可される階層か判定する
    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced)
    }
}

impl std::str::FromStr for SubscriptionLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "standard" => Ok(Self::Standard),
            "advanced" => Ok(Self::Advanced),
            _ => Err(DomainError::Validation(format!(
                "不正なサブスクリプション階層: {}",
                s
            ))),
        }
    }
}

/// サブスクリプションプラン
///
/// プラン名と利用上限の組。管理者 API からグローバルに更新される。
///
/// # 不変条件
///
/// - `limit` は 0 以上
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    name:  PlanName,
    limit: i64,
}

impl Plan {
    /// プランを作成する
    ///
    /// # エラー
    ///
    /// `limit` が負の場合は `DomainError::Validation` を返す。
    pub fn new(name: PlanName, limit: i64) -> Result<Self, DomainError> {
        if limit < 0 {
            return Err(DomainError::Validation(
                "利用上限は 0 以上である必要があります".to_string(),
            ));
        }
        Ok(Self { name, limit })
    }

    pub fn name(&self) -> &PlanName {
        &self.name
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // SubscriptionLevel のテスト

    #[rstest]
    #[case("free", SubscriptionLevel::Free)]
    #[case("standard", SubscriptionLevel::Standard)]
    #[case("advanced", SubscriptionLevel::Advanced)]
    fn test_階層は文字列からパースできる(
        #[case] input: &str,
        #[case] expected: SubscriptionLevel,
    ) {
        assert_eq!(input.parse::<SubscriptionLevel>().unwrap(), expected);
    }

    #[test]
    fn test_不明な階層はパースエラー() {
        assert!("premium".parse::<SubscriptionLevel>().is_err());
    }

    #[test]
    fn test_階層のdb文字列は小文字() {
        let level_str: &str = SubscriptionLevel::Advanced.into();
        assert_eq!(level_str, "advanced");
    }

    #[test]
    fn test_advancedのみ高度なアクセスを許可する() {
        assert!(SubscriptionLevel::Advanced.is_advanced());
        assert!(!SubscriptionLevel::Standard.is_advanced());
        assert!(!SubscriptionLevel::Free.is_advanced());
    }

    #[test]
    fn test_階層のjsonシリアライズは小文字() {
        let json = serde_json::to_value(SubscriptionLevel::Advanced).unwrap();
        assert_eq!(json, serde_json::json!("advanced"));
    }

    // Plan のテスト

    #[test]
    fn test_プランは正常な値で作成できる() {
        let plan = Plan::new(PlanName::new("standard").unwrap(), 100).unwrap();

        assert_eq!(plan.name().as_str(), "standard");
        assert_eq!(plan.limit(), 100);
    }

    #[test]
    fn test_プランの上限0は有効() {
        assert!(Plan::new(PlanName::new("free").unwrap(), 0).is_ok());
    }

    #[test]
    fn test_プランの負の上限は無効() {
        assert!(Plan::new(PlanName::new("free").unwrap(), -1).is_err());
    }
}
