use std::sync::LazyLock;

use regex::Regex;

use crate::classifier::looks_like_question;

static PHONE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-()]").expect("phone separator pattern is valid"));
static AU_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+?61|0)?4\d{8}$").expect("mobile pattern is valid"));
static AU_LANDLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+?61|0)?[2-9]\d{7,8}$").expect("landline pattern is valid"));

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;

/// Syntactic screen for a person's name: 2 to 50 characters, not phrased as a question,
/// and at least 70% letters or whitespace.
pub fn is_valid_name(input: &str) -> bool {
    let name = input.trim();
    let length = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&length) {
        return false;
    }
    if looks_like_question(name) {
        return false;
    }

    let letters = name.chars().filter(|c| c.is_alphabetic() || c.is_whitespace()).count();
    letters * 10 >= length * 7
}

/// Australian mobile or landline, with or without a `0`, `61` or `+61` prefix.
pub fn is_valid_phone(input: &str) -> bool {
    let cleaned = PHONE_SEPARATORS.replace_all(input, "");
    AU_MOBILE.is_match(&cleaned) || AU_LANDLINE.is_match(&cleaned)
}

/// Suburb and job description take any non-blank text.
pub fn is_present(input: &str) -> bool {
    !input.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::{is_present, is_valid_name, is_valid_phone};

    #[test]
    fn accepts_australian_mobiles_and_landlines() {
        for phone in ["0412345678", "+61412345678", "03 9123 4567", "0448 195 614", "(03) 9123-4567"]
        {
            assert!(is_valid_phone(phone), "{phone} should be accepted");
        }
    }

    #[test]
    fn rejects_short_foreign_and_non_numeric_input() {
        for phone in ["12345", "not a phone", "041234", "+1 415 555 0100", "0412 345 6789 0"] {
            assert!(!is_valid_phone(phone), "{phone} should be rejected");
        }
    }

    #[test]
    fn names_must_not_look_like_questions() {
        assert!(is_valid_name("John Smith"));
        assert!(is_valid_name("  Mary-Jane O'Neil  "));
        assert!(!is_valid_name("how much does it cost?"));
        assert!(!is_valid_name("where are you?"));
    }

    #[test]
    fn names_are_bounded_and_mostly_letters() {
        assert!(!is_valid_name("J"));
        assert!(!is_valid_name(&"a".repeat(51)));
        assert!(is_valid_name(&"a".repeat(50)));
        assert!(!is_valid_name("0448195614"));
        assert!(!is_valid_name("Jo 123"));
    }

    #[test]
    fn free_text_fields_only_need_content() {
        assert!(is_present("Clyde North"));
        assert!(!is_present("   "));
    }
}
