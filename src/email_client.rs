use crate::domain::EmailAddress;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

/// A message ready to hand to the email provider.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: EmailAddress,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    /// Overrides the configured sender when present.
    pub from: Option<String>,
}

#[derive(Debug, serde::Serialize, PartialEq)]
pub struct SentEmail {
    pub id: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,
    #[error("Failed to reach the email provider")]
    Request(#[from] reqwest::Error),
}

pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: String,
    authorization_token: Option<Secret<String>>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: String,
        authorization_token: Option<Secret<String>>,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        // An empty key in the environment means the provider was never set up.
        let authorization_token =
            authorization_token.filter(|token| !token.expose_secret().trim().is_empty());
        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.authorization_token.is_some()
    }

    #[tracing::instrument(
        name = "Sending email through provider",
        skip(self, email),
        fields(recipient = %email.to, subject = %email.subject)
    )]
    pub async fn send_email(&self, email: &OutgoingEmail) -> Result<SentEmail, EmailError> {
        let token = self
            .authorization_token
            .as_ref()
            .ok_or(EmailError::NotConfigured)?;

        let url = format!("{}/emails", self.base_url);
        let request_body = SendEmailRequest {
            from: email.from.as_deref().unwrap_or(&self.sender),
            to: [email.to.as_ref()],
            subject: &email.subject,
            html: &email.html,
            text: email.text.as_deref(),
        };
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let id = serde_json::from_slice::<SendEmailResponse>(&body)
            .ok()
            .and_then(|r| r.id);
        Ok(SentEmail { id })
    }
}

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(serde::Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}
