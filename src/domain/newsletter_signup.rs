use crate::domain::{sanitize_optional, EmailAddress};

pub const DEFAULT_SOURCE: &str = "newsletter_signup";

#[derive(Debug, Clone)]
pub struct NewsletterSignup {
    pub email: EmailAddress,
    pub name: Option<String>,
    pub source: String,
}

impl NewsletterSignup {
    /// Emails are stored lower-cased; a blank name or source falls back to
    /// `None` and `newsletter_signup` respectively.
    pub fn new(email: EmailAddress, name: Option<String>, source: Option<String>) -> Self {
        let source = source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
        Self {
            email: email.to_lowercase(),
            name: sanitize_optional(name),
            source,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("there")
    }
}
