//! WordOracle trait 定義
//!
//! 単語が実在するかを外部の辞書に問い合わせるためのインターフェース。

use async_trait::async_trait;

use super::OracleError;

#[async_trait]
pub trait WordOracle: Send + Sync {
    /// 単語が辞書に載っていれば `Ok(true)`
    ///
    /// 問い合わせ自体に失敗した場合は `Err` を返す。呼び出し側はこれを
    /// 「存在しない」として扱う。
    async fn word_exists(&self, word: &str) -> Result<bool, OracleError>;
}

#[cfg(test)]
mockall::mock! {
    pub WordOracle {}

    #[async_trait]
    impl WordOracle for WordOracle {
        async fn word_exists(&self, word: &str) -> Result<bool, OracleError>;
    }
}
