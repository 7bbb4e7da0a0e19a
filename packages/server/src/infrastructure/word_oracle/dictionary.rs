//! 単語リストを使った WordOracle 実装
//!
//! 1 行 1 単語のファイルを読み込む。空行と `#` で始まる行は無視する。
//! 外部サービスに接続できない環境やテストで使う。

use std::{collections::HashSet, io, path::Path};

use async_trait::async_trait;

use crate::domain::{OracleError, WordOracle};

#[derive(Debug, Clone, Default)]
pub struct DictionaryWordOracle {
    words: HashSet<String>,
}

impl DictionaryWordOracle {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty() && !w.starts_with('#'))
            .collect();
        Self { words }
    }

    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_words(content.lines()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[async_trait]
impl WordOracle for DictionaryWordOracle {
    async fn word_exists(&self, word: &str) -> Result<bool, OracleError> {
        Ok(self.words.contains(word.trim()))
    }
}
