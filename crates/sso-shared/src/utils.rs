//! Utility functions

/// Masks a login identifier for log output.
///
/// Emails keep the first two characters of the local part and the domain,
/// anything else keeps its first two characters.
pub fn mask_identifier(identifier: &str) -> String {
    if let Some(at_pos) = identifier.find('@') {
        let (local, domain) = identifier.split_at(at_pos);
        format!("{}***{}", prefix(local), domain)
    } else if identifier.is_empty() {
        "***".to_string()
    } else {
        format!("{}***", prefix(identifier))
    }
}

fn prefix(s: &str) -> String {
    let keep = if s.chars().count() <= 2 { 1 } else { 2 };
    s.chars().take(keep).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_identifier("jane.doe@example.com"), "ja***@example.com");
        assert_eq!(mask_identifier("jo@example.com"), "j***@example.com");
    }

    #[test]
    fn test_mask_username_and_admission_number() {
        assert_eq!(mask_identifier("admin"), "ad***");
        assert_eq!(mask_identifier("21A91A0501"), "21***");
        assert_eq!(mask_identifier(""), "***");
    }
}
