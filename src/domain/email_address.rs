use validator::validate_email;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(s: String) -> Result<EmailAddress, String> {
        let trimmed = s.trim();
        if validate_email(trimmed) && has_dotted_domain(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err("Invalid email address".into())
        }
    }

    pub fn to_lowercase(&self) -> EmailAddress {
        Self(self.0.to_lowercase())
    }
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain.
fn has_dotted_domain(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = s.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    !local.is_empty()
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
