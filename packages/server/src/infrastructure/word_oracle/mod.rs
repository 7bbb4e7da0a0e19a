//! 単語辞書（WordOracle）の実装
//!
//! - `weblio`: Weblio 辞書のページを取得して判定する
//! - `dictionary`: 手元の単語リストで判定する（オフライン）

pub mod dictionary;
pub mod weblio;

pub use dictionary::DictionaryWordOracle;
pub use weblio::WeblioWordOracle;
