//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクト生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("game id must not be empty")]
    EmptyGameId,

    #[error("word must not be empty")]
    EmptyWord,
}

/// ロビー参加時に重複した項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    /// 同じ接続から既に参加済み
    Connection,
    /// 表示名が既に使われている
    UserName,
    /// 外部ユーザー ID が既に使われている
    UserId,
}

impl std::fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicateField::Connection => write!(f, "connection"),
            DuplicateField::UserName => write!(f, "userName"),
            DuplicateField::UserId => write!(f, "userId"),
        }
    }
}

/// ロビー操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("duplicate identity: {0} is already waiting")]
    DuplicateIdentity(DuplicateField),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' is not connected")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// 単語辞書（WordOracle）問い合わせのエラー
///
/// いずれのエラーも「単語として確認できなかった」扱いになる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("dictionary request failed: {0}")]
    RequestFailed(String),

    #[error("dictionary returned unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("dictionary lookup timed out after {0} ms")]
    Timeout(u128),
}
