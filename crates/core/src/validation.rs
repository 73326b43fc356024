//! Input validation utilities.
//!
//! Free-text fields arrive from form inputs and command-line arguments; these helpers normalise
//! them (trim, drop blanks) and bound their size before they reach a record.

use crate::constants::MAX_NOTE_LEN;
use crate::{WardError, WardResult};

/// Trims an optional free-text value; blank input becomes `None`.
///
/// # Errors
///
/// Returns `WardError::InvalidInput` if the trimmed text is longer than [`MAX_NOTE_LEN`].
pub fn clean_text(field: &str, value: Option<String>) -> WardResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTE_LEN {
        return Err(WardError::InvalidInput(format!(
            "{field} exceeds maximum length of {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(Some(trimmed.to_owned()))
}

/// Validates the shape of an e-mail address.
///
/// This is a structural check only: exactly one `@`, a non-empty local part, a domain containing
/// a dot, and no whitespace.
pub fn validate_email(email: &str) -> WardResult<()> {
    let invalid = || WardError::InvalidInput(format!("invalid e-mail address: '{email}'"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels_ok = domain.split('.').count() >= 2 && domain.split('.').all(|l| !l.is_empty());
    if !labels_ok {
        return Err(invalid());
    }
    Ok(())
}

/// Trims each entry, drops blanks and removes duplicates while keeping first-seen order.
pub fn normalise_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        push_unique(&mut out, &item);
    }
    out
}

/// Appends `entry` (trimmed) unless it is blank or already present. Returns whether it was added.
pub fn push_unique(list: &mut Vec<String>, entry: &str) -> bool {
    let entry = entry.trim();
    if entry.is_empty() || list.iter().any(|existing| existing == entry) {
        return false;
    }
    list.push(entry.to_owned());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_drops_blank_and_trims() {
        assert_eq!(clean_text("notes", None).unwrap(), None);
        assert_eq!(clean_text("notes", Some("   ".into())).unwrap(), None);
        assert_eq!(
            clean_text("notes", Some("  NPO after midnight ".into())).unwrap(),
            Some("NPO after midnight".into())
        );
    }

    #[test]
    fn clean_text_bounds_length() {
        let long = "x".repeat(MAX_NOTE_LEN + 1);
        assert!(matches!(
            clean_text("notes", Some(long)),
            Err(WardError::InvalidInput(msg)) if msg.contains("notes")
        ));
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("john.doe@email.com").is_ok());
        for bad in ["john.doe", "@email.com", "john@", "john@email", "jo hn@email.com", "a@b@c.d"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn lists_are_trimmed_and_deduplicated_in_order() {
        let list = normalise_list(vec![
            " Penicillin".into(),
            "Shellfish".into(),
            "".into(),
            "Penicillin ".into(),
        ]);
        assert_eq!(list, vec!["Penicillin", "Shellfish"]);
    }

    #[test]
    fn push_unique_reports_whether_added() {
        let mut list = vec!["Latex".to_string()];
        assert!(!push_unique(&mut list, " Latex "));
        assert!(!push_unique(&mut list, "  "));
        assert!(push_unique(&mut list, "Iodine"));
        assert_eq!(list, vec!["Latex", "Iodine"]);
    }
}
