/// Percentage discount for a coupon code, case-insensitively matched.
///
/// The discount is only ever echoed back to the client for display; stored
/// order totals are never adjusted by it.
#[must_use]
pub fn discount_for_code(code: &str) -> Option<u32> {
    match code.trim().to_ascii_uppercase().as_str() {
        "SAVE10" => Some(10),
        "OFF20" => Some(20),
        "BIG30" => Some(30),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_percentages() {
        assert_eq!(discount_for_code("SAVE10"), Some(10));
        assert_eq!(discount_for_code("OFF20"), Some(20));
        assert_eq!(discount_for_code("BIG30"), Some(30));
    }

    #[test]
    fn codes_match_case_insensitively() {
        assert_eq!(discount_for_code("save10"), Some(10));
        assert_eq!(discount_for_code("  Off20 "), Some(20));
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(discount_for_code("SAVE50"), None);
        assert_eq!(discount_for_code(""), None);
    }
}
