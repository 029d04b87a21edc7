//! Display formatting helpers for phone numbers and currency amounts.

/// Format a bare digit string as a Korean phone number.
///
/// Mobile numbers (11 digits) split 3-4-4, Seoul numbers keep their
/// two-digit `02` prefix, and other area codes split 3-3-4. Strings that
/// do not look like a Korean phone number are returned unchanged.
pub fn format_korean_phone_number(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        11 if digits.starts_with("01") => {
            format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..])
        }
        10 if digits.starts_with("02") => {
            format!("{}-{}-{}", &digits[..2], &digits[2..6], &digits[6..])
        }
        9 if digits.starts_with("02") => {
            format!("{}-{}-{}", &digits[..2], &digits[2..5], &digits[5..])
        }
        10 if digits.starts_with('0') => {
            format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
        }
        _ => input.to_string(),
    }
}

/// True when the string contains a plausible Korean phone number
/// (hyphens allowed, 9 to 11 digits, leading zero).
pub fn is_valid_korean_phone(input: &str) -> bool {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if input.chars().any(|c| !c.is_ascii_digit() && c != '-') {
        return false;
    }
    (9..=11).contains(&digits.len()) && digits.starts_with('0')
}

/// Insert thousands separators into a non-negative integer string.
/// Non-numeric input is returned unchanged.
pub fn format_number(input: &str) -> String {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len() + input.len() / 3);
    let offset = input.len() % 3;
    for (i, c) in input.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Strip thousands separators.
pub fn remove_commas(input: &str) -> String {
    input.chars().filter(|c| *c != ',').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mobile_number() {
        assert_eq!(format_korean_phone_number("01012345678"), "010-1234-5678");
        assert_eq!(format_korean_phone_number("01098765432"), "010-9876-5432");
    }

    #[test]
    fn test_format_seoul_number() {
        assert_eq!(format_korean_phone_number("0212345678"), "02-1234-5678");
        assert_eq!(format_korean_phone_number("021234567"), "02-123-4567");
    }

    #[test]
    fn test_format_area_code_number() {
        assert_eq!(format_korean_phone_number("0311234567"), "031-123-4567");
    }

    #[test]
    fn test_format_passthrough() {
        assert_eq!(format_korean_phone_number("12345"), "12345");
        assert_eq!(format_korean_phone_number(""), "");
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_korean_phone("01012345678"));
        assert!(is_valid_korean_phone("010-1234-5678"));
        assert!(is_valid_korean_phone("0212345678"));
        assert!(!is_valid_korean_phone("1234"));
        assert!(!is_valid_korean_phone("12345678901"));
        assert!(!is_valid_korean_phone("010 1234 5678"));
        assert!(!is_valid_korean_phone("not-a-phone"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number("0"), "0");
        assert_eq!(format_number("999"), "999");
        assert_eq!(format_number("1000"), "1,000");
        assert_eq!(format_number("1234567"), "1,234,567");
        assert_eq!(format_number("120000"), "120,000");
    }

    #[test]
    fn test_remove_commas_round_trip() {
        for value in ["0", "7", "42", "999", "1000", "65536", "1234567", "98765432109"] {
            assert_eq!(remove_commas(&format_number(value)), value);
        }
    }
}
