//! Display formatting for phone numbers and postal addresses.

/// Pretty-print a phone number.
///
/// - 10 digits: `(AAA) BBB-CCCC`
/// - 11 digits with a leading `1`: `+1 (AAA) BBB-CCCC`
/// - other input starting with `+`: `+` followed by its digits
/// - anything else is returned trimmed
pub fn format_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    match digits.len() {
        10 => format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("+1 ({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ if trimmed.starts_with('+') && !digits.is_empty() => format!("+{}", digits),
        _ => trimmed.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AddressParts<'a> {
    pub line1: Option<&'a str>,
    pub line2: Option<&'a str>,
    pub city: Option<&'a str>,
    pub region: Option<&'a str>,
    pub postal_code: Option<&'a str>,
    pub country: Option<&'a str>,
}

fn clean(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// `line1, line2, City, ST 12345, Country`, skipping empty parts.
pub fn format_address(parts: &AddressParts<'_>) -> String {
    let region_postal = [clean(parts.region), clean(parts.postal_code)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    [
        clean(parts.line1),
        clean(parts.line2),
        clean(parts.city),
        Some(region_postal.as_str()).filter(|s| !s.is_empty()),
        clean(parts.country),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_north_american_numbers() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("555.123.4567"), "(555) 123-4567");
        assert_eq!(format_phone("1-555-123-4567"), "+1 (555) 123-4567");
        assert_eq!(format_phone("+1 (555) 123 4567"), "+1 (555) 123-4567");
    }

    #[test]
    fn international_numbers_keep_their_digits() {
        assert_eq!(format_phone("+44 20 7946 0958"), "+442079460958");
    }

    #[test]
    fn unrecognized_input_is_trimmed() {
        assert_eq!(format_phone("  ext. 42 "), "ext. 42");
        assert_eq!(format_phone("21234567890"), "21234567890");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn blank_parts_are_dropped_and_others_trimmed() {
        assert_eq!(clean(Some("  Springfield ")), Some("Springfield"));
        assert_eq!(clean(Some("   ")), None);
        assert_eq!(clean(None), None);
    }

    #[test]
    fn address_skips_blank_parts() {
        let full = AddressParts {
            line1: Some("1 Main St"),
            line2: Some("Suite 4"),
            city: Some("Springfield"),
            region: Some("IL"),
            postal_code: Some("62701"),
            country: Some("USA"),
        };
        assert_eq!(format_address(&full), "1 Main St, Suite 4, Springfield, IL 62701, USA");

        let sparse = AddressParts {
            line1: Some("1 Main St"),
            line2: Some("  "),
            postal_code: Some("62701"),
            ..Default::default()
        };
        assert_eq!(format_address(&sparse), "1 Main St, 62701");
        assert_eq!(format_address(&AddressParts::default()), "");
    }
}
