//! # ユーザー識別子
//!
//! ユーザー ID の Newtype を定義する。
//!
//! ユーザーアカウント自体（登録、プロフィール、認証情報）は
//! この API の管轄外で管理されるため、エンティティは持たない。
//! この API が扱うのは「どのユーザーがリソースを所有しているか」のみ。

define_i64_id! {
    /// ユーザー ID（一意識別子）
    ///
    /// 外部のアカウント基盤が採番した数値 ID をラップする。
    /// Newtype パターンで `ProjectId` 等との取り違えを型レベルで防ぐ。
    pub struct UserId;
}
