//! Search text normalization.

use unicode_normalization::UnicodeNormalization;

/// First and last katakana code points that have a hiragana counterpart.
const KATAKANA_START: char = '\u{30A1}';
const KATAKANA_END: char = '\u{30F6}';
/// Distance between a katakana code point and its hiragana twin.
const KANA_OFFSET: u32 = 0x60;

/// Fold `input` into the form used for substring matching.
///
/// The text is NFKC-normalized (composing combining marks and unifying
/// full/half width), katakana are rewritten as hiragana and ASCII letters
/// are lower-cased. Everything else passes through untouched. Folding can
/// expose new compositions (`W` + ring above has none, `w` + ring above
/// does), so the folded text is composed once more to keep the result
/// stable under repeated application.
pub fn normalize_search_text(input: &str) -> String {
    input.nfkc().map(fold_char).nfkc().collect()
}

fn fold_char(ch: char) -> char {
    if (KATAKANA_START..=KATAKANA_END).contains(&ch) {
        char::from_u32(ch as u32 - KANA_OFFSET).unwrap_or(ch)
    } else {
        ch.to_ascii_lowercase()
    }
}
