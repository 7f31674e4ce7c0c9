use crate::domain::sanitize_input;
use unicode_segmentation::UnicodeSegmentation;

const MAX_LENGTH: usize = 100;

#[derive(Debug, Clone)]
pub struct ContactName(String);

impl ContactName {
    /// Sanitizes the input and checks it is non-empty and at most
    /// 100 graphemes long.
    pub fn parse(s: String) -> Result<ContactName, String> {
        let sanitized = sanitize_input(&s);

        if sanitized.is_empty() {
            return Err("Name is required".into());
        }
        if sanitized.graphemes(true).count() > MAX_LENGTH {
            return Err("Name too long".into());
        }
        Ok(Self(sanitized))
    }
}

impl AsRef<str> for ContactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
