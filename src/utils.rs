// see https://stackoverflow.com/questions/38406793/why-is-capitalizing-the-first-letter-of-a-string-so-convoluted-in-rust
pub fn apply_to_first<F>(string: &str, func: F) -> String
where
    F: Fn(char) -> String,
{
    let mut c = string.chars();
    match c.next() {
        None => String::new(),
        Some(first) => func(first) + c.as_str(),
    }
}

pub fn is_title_case(string: &str) -> bool {
    let mut char_case = string.chars().map(|x| x.is_uppercase());

    char_case.next().unwrap_or(false) && !char_case.any(|x| x)
}

/// Whether a line counts as all-uppercase: at least one cased character and
/// no lowercase ones.
pub fn is_uppercase(string: &str) -> bool {
    string.chars().any(|x| x.is_uppercase()) && !string.chars().any(|x| x.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_char_can_be_capitalized() {
        assert_eq!(
            apply_to_first("she said", |c| c.to_uppercase().collect()),
            "She said"
        );
        assert_eq!(apply_to_first("", |c| c.to_uppercase().collect()), "");
    }

    #[test]
    fn title_case_is_detected() {
        assert!(is_title_case("London"));
        assert!(!is_title_case("london"));
        assert!(!is_title_case("LONDON"));
    }

    #[test]
    fn uppercase_needs_a_cased_char() {
        assert!(is_uppercase("THIS IS A TEST ."));
        assert!(!is_uppercase("This is a test ."));
        assert!(!is_uppercase("1234 ."));
    }
}
