//! Postcode area derivation and London area sets

/// Postcode areas that make up Greater London
pub const LONDON_POSTCODE_AREAS: [&str; 20] = [
    // Central London
    "EC", "WC", "E", "N", "NW", "SE", "SW", "W",
    // Greater London
    "BR", "CR", "DA", "EN", "HA", "IG", "KT", "RM", "SM", "TW", "UB", "WD",
];

/// Postcode areas of Central London
pub const CENTRAL_LONDON_POSTCODE_AREAS: [&str; 8] = ["EC", "WC", "E", "N", "NW", "SE", "SW", "W"];

/// Derive the postcode area from a full postcode
///
/// The area is the leading letter when the second character is a digit
/// ("E1 6AN" -> "E"), otherwise the leading two characters ("SW1A 1AA" -> "SW").
pub fn postcode_area(postcode: &str) -> Option<String> {
    let trimmed = postcode.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }

    let area = match chars.next() {
        Some(second) if second.is_ascii_digit() => first.to_string(),
        Some(second) => format!("{}{}", first, second),
        None => first.to_string(),
    };

    Some(area.to_ascii_uppercase())
}

/// Whether an area belongs to Greater London
pub fn is_london_area(area: &str) -> bool {
    LONDON_POSTCODE_AREAS.contains(&area)
}

/// Whether an area belongs to Central London
pub fn is_central_london_area(area: &str) -> bool {
    CENTRAL_LONDON_POSTCODE_AREAS.contains(&area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postcode_area() {
        assert_eq!(postcode_area("E1 6AN").as_deref(), Some("E"));
        assert_eq!(postcode_area("SW1A 1AA").as_deref(), Some("SW"));
        assert_eq!(postcode_area("b15 2tt").as_deref(), Some("B"));
        assert_eq!(postcode_area("  NW3 2QG").as_deref(), Some("NW"));
        assert_eq!(postcode_area(""), None);
        assert_eq!(postcode_area("1AB"), None);
    }

    #[test]
    fn test_london_membership() {
        assert!(is_london_area("SE"));
        assert!(is_london_area("KT"));
        assert!(!is_london_area("B"));
        assert!(is_central_london_area("WC"));
        assert!(!is_central_london_area("KT"));
    }
}
