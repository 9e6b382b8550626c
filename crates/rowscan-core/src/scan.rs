//! Scanned-code cleanup.

use crate::delimited::DELIMITER;

/// Removes every `;` from a scanner payload, then trims whitespace.
///
/// Scanners configured for the data files may append or embed the field
/// delimiter, which must not reach the query.
pub fn normalize(raw: &str) -> String {
    raw.replace(DELIMITER, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_delimiters_and_whitespace() {
        assert_eq!(normalize(" 12;34 "), "1234");
        assert_eq!(normalize("4607;"), "4607");
        assert_eq!(normalize(";;;"), "");
    }

    #[test]
    fn trims_after_removing_delimiters() {
        assert_eq!(normalize("; 56 ;"), "56");
    }

    #[test]
    fn inner_spaces_survive() {
        assert_eq!(normalize("AB 12"), "AB 12");
    }
}
