/// Issuer of a learner's user id, as far as its shape tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierScheme {
    /// Decimal ids, issued by the MOE identity provider.
    Moe,
    /// Hex ids, issued by CampusIL itself.
    CampusIl,
    Unknown,
}

/// Classifies a raw user id.
///
/// Decimal digits are a subset of hex digits, so the decimal check runs first.
pub fn classify_identifier(raw: &str) -> IdentifierScheme {
    if raw.is_empty() {
        IdentifierScheme::Unknown
    } else if raw.bytes().all(|b| b.is_ascii_digit()) {
        IdentifierScheme::Moe
    } else if raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        IdentifierScheme::CampusIl
    } else {
        IdentifierScheme::Unknown
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_digit_class() {
        assert_eq!(classify_identifier("12345"), IdentifierScheme::Moe);
        assert_eq!(classify_identifier("1a2b3c"), IdentifierScheme::CampusIl);
        assert_eq!(classify_identifier("DEADbeef"), IdentifierScheme::CampusIl);
        assert_eq!(classify_identifier("abc-def"), IdentifierScheme::Unknown);
    }

    #[test]
    fn edge_shapes_are_unknown() {
        assert_eq!(classify_identifier(""), IdentifierScheme::Unknown);
        assert_eq!(classify_identifier(" 123"), IdentifierScheme::Unknown);
        assert_eq!(classify_identifier("١٢٣"), IdentifierScheme::Unknown);
        assert_eq!(classify_identifier("0x1f"), IdentifierScheme::Unknown);
    }
}
