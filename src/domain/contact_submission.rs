use crate::domain::{ContactMessage, ContactName, EmailAddress};

#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub name: ContactName,
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub business: Option<String>,
    pub message: ContactMessage,
    pub subscribe_newsletter: bool,
}
