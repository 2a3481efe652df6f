//! Field-level checks shared by registration and admin user management.

/// Trim + lowercase; e-mail columns only ever store this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn valid_email(email: &str) -> bool {
    let e = email.trim();
    e.len() >= 3 && e.len() <= 255 && e.contains('@') && !e.starts_with('@') && !e.ends_with('@')
}

pub fn valid_password(password: &str) -> bool {
    password.len() >= 8
}

pub fn valid_full_name(name: &str) -> bool {
    let n = name.trim();
    !n.is_empty() && n.len() <= 128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization_folds_case_and_whitespace() {
        assert_eq!(normalize_email("  Kasun@Example.COM "), "kasun@example.com");
    }

    #[test]
    fn email_shape() {
        assert!(valid_email("a@b.lk"));
        assert!(!valid_email("nope"));
        assert!(!valid_email("@start.lk"));
        assert!(!valid_email("end@"));
    }

    #[test]
    fn password_minimum_length() {
        assert!(valid_password("longenough"));
        assert!(!valid_password("short"));
    }
}
