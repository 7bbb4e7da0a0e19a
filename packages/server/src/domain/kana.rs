//! しりとりの「次の文字」を決めるためのかな正規化。
//!
//! 小書きのかな（ゃ・っ など）は、直後のコードポイントにある通常のかなとして扱う。

/// 直後のコードポイントが通常のかなになる小書きのかな
const SMALL_KANA: [char; 18] = [
    'ぁ', 'ぃ', 'ぅ', 'ぇ', 'ぉ', 'っ', 'ゃ', 'ゅ', 'ょ', //
    'ァ', 'ィ', 'ゥ', 'ェ', 'ォ', 'ッ', 'ャ', 'ュ', 'ョ',
];

/// 小書きのかなを通常のかなに変換する。それ以外の文字はそのまま返す。
pub fn normalize_kana(c: char) -> char {
    if SMALL_KANA.contains(&c) {
        char::from_u32(c as u32 + 1).unwrap_or(c)
    } else {
        c
    }
}

/// 単語の連鎖から、次の単語が始まるべき文字を求める。
///
/// 連鎖が空なら `default_char`、そうでなければ最後の単語の最後の文字を正規化したもの。
pub fn continuation_char<S: AsRef<str>>(chain: &[S], default_char: char) -> char {
    chain
        .last()
        .and_then(|word| word.as_ref().chars().next_back())
        .map(normalize_kana)
        .unwrap_or(default_char)
}
