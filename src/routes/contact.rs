use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use anyhow::Context;

use crate::configuration::{ContactSettings, SiteSettings};
use crate::domain::{
    sanitize_optional, ContactMessage, ContactName, ContactSubmission, EmailAddress,
};
use crate::email_client::{EmailClient, OutgoingEmail};
use crate::routes::error_chain_fmt;
use crate::templates;
use crate::workflow_client::{WorkflowClient, WorkflowEvent};

/// Where contact form submissions are delivered.
pub struct ContactInbox {
    pub recipient: EmailAddress,
    pub subject: String,
    pub send_confirmation: bool,
}

impl ContactInbox {
    pub fn from_settings(settings: &ContactSettings) -> Result<Self, String> {
        Ok(Self {
            recipient: settings.recipient()?,
            subject: settings.subject.clone(),
            send_confirmation: settings.send_confirmation,
        })
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    business: Option<String>,
    message: Option<String>,
    subscribe_newsletter: Option<bool>,
}

impl TryFrom<ContactRequest> for ContactSubmission {
    type Error = Vec<String>;

    /// Collects every field error so the caller can show them all at once.
    fn try_from(request: ContactRequest) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();
        let name = ContactName::parse(request.name.unwrap_or_default())
            .map_err(|e| errors.push(e))
            .ok();
        let email = EmailAddress::parse(request.email.unwrap_or_default())
            .map_err(|e| errors.push(e))
            .ok();
        let message = ContactMessage::parse(request.message.unwrap_or_default())
            .map_err(|e| errors.push(e))
            .ok();

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) => Ok(ContactSubmission {
                name,
                email,
                phone: sanitize_optional(request.phone),
                business: sanitize_optional(request.business),
                message,
                subscribe_newsletter: request.subscribe_newsletter.unwrap_or(false),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error("Invalid input")]
    ValidationError(Vec<String>),
    #[error("Email service not configured")]
    NotConfigured,
    #[error("Failed to send email")]
    SendFailed(#[source] anyhow::Error),
}

impl std::fmt::Debug for ContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ContactError::NotConfigured | ContactError::SendFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ContactError::ValidationError(details) => serde_json::json!({
                "error": self.to_string(),
                "details": details,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Contact form bodies that are not valid JSON are treated as invalid input.
pub fn contact_json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    let response = ContactError::ValidationError(vec![err.to_string()]).error_response();
    InternalError::from_response(err, response).into()
}

#[tracing::instrument(
    name = "Handling a contact form submission",
    skip(body, email_client, workflow_client, inbox, site),
    fields(
        contact_email = tracing::field::Empty,
        contact_name = tracing::field::Empty
    )
)]
pub async fn contact(
    body: web::Json<ContactRequest>,
    email_client: web::Data<EmailClient>,
    workflow_client: web::Data<WorkflowClient>,
    inbox: web::Data<ContactInbox>,
    site: web::Data<SiteSettings>,
) -> Result<HttpResponse, ContactError> {
    let submission: ContactSubmission =
        body.0.try_into().map_err(ContactError::ValidationError)?;
    tracing::Span::current()
        .record("contact_email", &tracing::field::display(&submission.email))
        .record("contact_name", &tracing::field::display(&submission.name));

    if !email_client.is_configured() {
        return Err(ContactError::NotConfigured);
    }

    let notification = templates::contact_notification(&submission, &inbox.subject);
    let notification = OutgoingEmail {
        to: inbox.recipient.clone(),
        subject: notification.subject,
        html: notification.html,
        text: Some(notification.text),
        from: None,
    };
    let workflow = async {
        if workflow_client.is_configured() {
            Some(
                workflow_client
                    .trigger(&WorkflowEvent::contact(&submission))
                    .await,
            )
        } else {
            None
        }
    };
    let confirmation = async {
        if inbox.send_confirmation {
            let content = templates::contact_confirmation(&submission, &site);
            let email = OutgoingEmail {
                to: submission.email.clone(),
                subject: content.subject,
                html: content.html,
                text: Some(content.text),
                from: None,
            };
            Some(email_client.send_email(&email).await)
        } else {
            None
        }
    };

    let (notified, workflow, confirmation) = tokio::join!(
        email_client.send_email(&notification),
        workflow,
        confirmation
    );

    if let Some(Err(e)) = workflow {
        tracing::error!(error.cause_chain = ?e, "Contact workflow webhook failed");
    }
    if let Some(Err(e)) = confirmation {
        tracing::error!(error.cause_chain = ?e, "Failed to send the contact confirmation email");
    }
    let sent = notified
        .context("Failed to deliver the contact form notification")
        .map_err(ContactError::SendFailed)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "messageId": sent.id,
    })))
}
