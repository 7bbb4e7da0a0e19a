//! Weblio を使った WordOracle 実装
//!
//! `https://www.weblio.jp/content/{word}` を取得し、ページに
//! 「該当する単語が見つかりません」が含まれていなければ実在する単語とみなす。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::domain::{OracleError, WordOracle};

pub const WEBLIO_BASE_URL: &str = "https://www.weblio.jp/content/";

/// 見出し語が見つからなかったときにページに現れる文言
const NOT_FOUND_MARKER: &str = "該当する単語が見つかりません";

/// ページの HTML から単語の有無を判定する
pub fn is_known_word_page(html: &str) -> bool {
    !html.contains(NOT_FOUND_MARKER)
}

#[derive(Debug)]
pub struct WeblioWordOracle {
    base_url: Url,
    timeout: Duration,
    client: reqwest::Client,
}

impl WeblioWordOracle {
    pub fn new(timeout: Duration) -> Result<Self, OracleError> {
        Self::with_base_url(WEBLIO_BASE_URL, timeout)
    }

    /// 問い合わせ先を差し替えて作成する
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, OracleError> {
        let base_url =
            Url::parse(base_url).map_err(|e| OracleError::RequestFailed(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::RequestFailed(e.to_string()))?;
        Ok(Self {
            base_url,
            timeout,
            client,
        })
    }

    /// 単語をパスの最後のセグメントとして付け加えた URL（パーセントエンコード済み）
    fn url_for(&self, word: &str) -> Result<Url, OracleError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                OracleError::RequestFailed(format!("cannot-be-a-base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }
}

#[async_trait]
impl WordOracle for WeblioWordOracle {
    async fn word_exists(&self, word: &str) -> Result<bool, OracleError> {
        let url = self.url_for(word)?;
        tracing::debug!("Looking up '{}' at {}", word, url);

        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout(self.timeout.as_millis())
            } else {
                OracleError::RequestFailed(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OracleError::UnexpectedStatus(status.as_u16()));
        }

        let html = resp
            .text()
            .await
            .map_err(|e| OracleError::RequestFailed(e.to_string()))?;
        let exists = is_known_word_page(&html);
        tracing::debug!("Weblio lookup result for '{}': {}", word, exists);
        Ok(exists)
    }
}
