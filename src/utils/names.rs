// Wed Oct 14 2026 - Alex

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Longest file name stem the portal accepts for an export.
pub const DEFAULT_MAX_NAME_CHARS: usize = 15;

static SINGLE_CHAR_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?.>").unwrap());
static NON_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z\s]+").unwrap());
static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]+").unwrap());

/// Drops accents by decomposing (NFKD) and discarding combining marks.
pub fn strip_accents(input: &str) -> String {
    input.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

fn tokens(input: &str, keep_digits: bool) -> Vec<String> {
    let plain = strip_accents(input);
    let untagged = SINGLE_CHAR_TAG.replace_all(&plain, "");
    let pattern = if keep_digits { &NON_ALPHANUMERIC } else { &NON_LETTERS };

    pattern
        .replace_all(&untagged, " ")
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Entity name as the portal writes it into export file names: the first
/// `max_chars` characters, letters only, lowercase, words joined by `_`.
///
/// Applying it twice yields the same result, so names already taken from
/// file names can be normalized again before comparing.
pub fn normalize_name(input: &str, max_chars: usize) -> String {
    let truncated: String = input.chars().take(max_chars).collect();
    let words = tokens(&truncated, false);

    if words.is_empty() {
        return truncated.to_lowercase().replace(' ', "_");
    }

    words.join("_").to_lowercase()
}

/// Column header in stacked reports: letters and digits, uppercase, `_` joined.
pub fn normalize_column_name(input: &str) -> String {
    tokens(input, true).join("_").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Olá!", DEFAULT_MAX_NAME_CHARS), "ola");
        assert_eq!(normalize_name("", DEFAULT_MAX_NAME_CHARS), "");
        assert_eq!(normalize_name("Côte d'Ivoire", DEFAULT_MAX_NAME_CHARS), "cote_d_ivoire");
        assert_eq!(normalize_name("<b>Brazil</b>", DEFAULT_MAX_NAME_CHARS), "brazil");
    }

    #[test]
    fn test_normalize_name_truncates_before_cleaning() {
        assert_eq!(
            normalize_name("United States of America", DEFAULT_MAX_NAME_CHARS),
            "united_states_o"
        );
        assert_eq!(
            normalize_name("Eu recebo R$ 1.000,00 por mês!", DEFAULT_MAX_NAME_CHARS),
            "eu_recebo_r"
        );
    }

    #[test]
    fn test_normalize_name_is_idempotent() {
        for name in ["Korea, Republic of", "Türkiye", "Hong Kong, China", "123"] {
            let once = normalize_name(name, DEFAULT_MAX_NAME_CHARS);
            assert_eq!(normalize_name(&once, DEFAULT_MAX_NAME_CHARS), once, "{}", name);
        }
    }

    #[test]
    fn test_normalize_name_fallback_keeps_input() {
        assert_eq!(normalize_name("123 45", DEFAULT_MAX_NAME_CHARS), "123_45");
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Duty (%)"), "DUTY");
        assert_eq!(normalize_column_name("HS 2017 code"), "HS_2017_CODE");
        assert_eq!(normalize_column_name("Tariff línea"), "TARIFF_LINEA");
    }
}
