mod contact_message;
mod contact_name;
mod contact_submission;
mod email_address;
mod newsletter_signup;
mod sanitize;

pub use contact_message::ContactMessage;
pub use contact_name::ContactName;
pub use contact_submission::ContactSubmission;
pub use email_address::EmailAddress;
pub use newsletter_signup::NewsletterSignup;
pub use sanitize::{sanitize_input, sanitize_optional};
