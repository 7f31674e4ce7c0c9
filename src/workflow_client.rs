use crate::domain::{ContactSubmission, NewsletterSignup};
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Payload forwarded for a contact form submission.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub message: String,
    pub business: Option<String>,
    pub subscribe_newsletter: bool,
    pub source: &'static str,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct NewsletterPayload {
    pub name: Option<String>,
    pub email: String,
    pub source: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TestPayload {
    pub message: &'static str,
    pub test: bool,
}

/// Events the automation workflow knows how to route.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    ContactForm(ContactPayload),
    ContactWithNewsletter(ContactPayload),
    NewsletterSignup(NewsletterPayload),
    Test(TestPayload),
}

impl WorkflowEvent {
    pub fn contact(submission: &ContactSubmission) -> Self {
        let payload = ContactPayload {
            name: submission.name.as_ref().to_string(),
            email: submission.email.as_ref().to_string(),
            message: submission.message.as_ref().to_string(),
            business: submission.business.clone(),
            subscribe_newsletter: submission.subscribe_newsletter,
            source: "contact_form",
        };
        if submission.subscribe_newsletter {
            Self::ContactWithNewsletter(payload)
        } else {
            Self::ContactForm(payload)
        }
    }

    pub fn newsletter(signup: &NewsletterSignup) -> Self {
        Self::NewsletterSignup(NewsletterPayload {
            name: signup.name.clone(),
            email: signup.email.as_ref().to_string(),
            source: signup.source.clone(),
        })
    }

    pub fn test() -> Self {
        Self::Test(TestPayload {
            message: "Test connection from AdvisoryAI website",
            test: true,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowEvent::ContactForm(_) => "contact_form",
            WorkflowEvent::ContactWithNewsletter(_) => "contact_with_newsletter",
            WorkflowEvent::NewsletterSignup(_) => "newsletter_signup",
            WorkflowEvent::Test(_) => "test",
        }
    }

    fn data(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            WorkflowEvent::ContactForm(p) | WorkflowEvent::ContactWithNewsletter(p) => {
                serde_json::to_value(p)
            }
            WorkflowEvent::NewsletterSignup(p) => serde_json::to_value(p),
            WorkflowEvent::Test(p) => serde_json::to_value(p),
        }
    }
}

#[derive(serde::Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    source: &'a str,
    timestamp: String,
    data: serde_json::Value,
}

#[derive(thiserror::Error, Debug)]
pub enum WorkflowError {
    #[error("Webhook URL not configured")]
    NotConfigured,
    #[error("Webhook answered with HTTP {0}")]
    Status(StatusCode),
    #[error("Failed to reach the workflow webhook")]
    Request(#[from] reqwest::Error),
    #[error("Failed to encode the workflow event")]
    Encoding(#[from] serde_json::Error),
}

pub struct WorkflowClient {
    http_client: Client,
    webhook_url: Option<String>,
    source: String,
    max_retries: u32,
    base_backoff: Duration,
}

impl WorkflowClient {
    pub fn new(
        webhook_url: Option<String>,
        source: String,
        max_retries: u32,
        base_backoff: Duration,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            webhook_url: webhook_url.filter(|url| !url.trim().is_empty()),
            source,
            max_retries,
            base_backoff,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Post the event to the webhook, retrying failed attempts with
    /// exponential backoff. Returns the webhook's JSON answer, or
    /// `{"status": "success"}` when it does not answer with JSON.
    #[tracing::instrument(
        name = "Triggering workflow webhook",
        skip(self, event),
        fields(event_type = %event.kind())
    )]
    pub async fn trigger(&self, event: &WorkflowEvent) -> Result<serde_json::Value, WorkflowError> {
        let url = match &self.webhook_url {
            Some(url) => url,
            None => {
                tracing::warn!("Workflow webhook URL not configured");
                return Err(WorkflowError::NotConfigured);
            }
        };
        let envelope = Envelope {
            kind: event.kind(),
            source: &self.source,
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            data: event.data()?,
        };

        let mut attempt = 0;
        loop {
            match self.post(url, &envelope).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error.cause_chain = ?e,
                        "Workflow webhook attempt failed"
                    );
                    if attempt >= self.max_retries {
                        return Err(e);
                    }
                }
            }
            tokio::time::sleep(backoff(attempt, self.base_backoff)).await;
            attempt += 1;
        }
    }

    pub async fn test_connection(&self) -> Result<serde_json::Value, WorkflowError> {
        self.trigger(&WorkflowEvent::test()).await
    }

    async fn post(
        &self,
        url: &str,
        envelope: &Envelope<'_>,
    ) -> Result<serde_json::Value, WorkflowError> {
        let response = self.http_client.post(url).json(envelope).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::Status(status));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)
            .unwrap_or_else(|_| serde_json::json!({ "status": "success" })))
    }
}

/// Delay before the retry that follows failed attempt `attempt` (0-based):
/// `base * 2^attempt` plus up to 10% jitter.
pub fn backoff(attempt: u32, base: Duration) -> Duration {
    let base_ms = base.as_millis().min(u64::MAX as u128) as u64;
    let delay_ms = base_ms.saturating_mul(2u64.saturating_pow(attempt));

    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms.saturating_add(jitter))
}
