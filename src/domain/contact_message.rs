use crate::domain::sanitize_input;
use unicode_segmentation::UnicodeSegmentation;

const MAX_LENGTH: usize = 1000;

#[derive(Debug, Clone)]
pub struct ContactMessage(String);

impl ContactMessage {
    pub fn parse(s: String) -> Result<ContactMessage, String> {
        let sanitized = sanitize_input(&s);

        if sanitized.is_empty() {
            return Err("Message is required".into());
        }
        if sanitized.graphemes(true).count() > MAX_LENGTH {
            return Err("Message too long".into());
        }
        Ok(Self(sanitized))
    }
}

impl AsRef<str> for ContactMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
