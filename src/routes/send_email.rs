use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

use crate::domain::EmailAddress;
use crate::email_client::{EmailClient, EmailError, OutgoingEmail};
use crate::routes::error_chain_fmt;

#[derive(serde::Deserialize)]
pub struct SendEmailRequest {
    to: Option<String>,
    subject: Option<String>,
    html: Option<String>,
    text: Option<String>,
    from: Option<String>,
}

#[derive(thiserror::Error)]
pub enum SendEmailError {
    #[error("Missing required fields: to, subject, html")]
    MissingFields,
    #[error("Invalid recipient email")]
    InvalidRecipient,
    #[error("Email service not configured")]
    NotConfigured,
    #[error("Failed to send email")]
    ProviderError(#[source] anyhow::Error),
}

impl std::fmt::Debug for SendEmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SendEmailError {
    fn status_code(&self) -> StatusCode {
        match self {
            SendEmailError::MissingFields | SendEmailError::InvalidRecipient => {
                StatusCode::BAD_REQUEST
            }
            SendEmailError::NotConfigured | SendEmailError::ProviderError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

#[tracing::instrument(
    name = "Relaying an email to the provider",
    skip(body, email_client),
    fields(recipient = tracing::field::Empty)
)]
pub async fn send_email(
    body: web::Json<SendEmailRequest>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, SendEmailError> {
    let SendEmailRequest {
        to,
        subject,
        html,
        text,
        from,
    } = body.into_inner();
    let (to, subject, html) = match (required(to), required(subject), required(html)) {
        (Some(to), Some(subject), Some(html)) => (to, subject, html),
        _ => return Err(SendEmailError::MissingFields),
    };
    let to = EmailAddress::parse(to).map_err(|_| SendEmailError::InvalidRecipient)?;
    tracing::Span::current().record("recipient", &tracing::field::display(&to));

    let email = OutgoingEmail {
        to,
        subject,
        html,
        text: required(text),
        from: required(from),
    };
    let sent = match email_client.send_email(&email).await {
        Ok(sent) => sent,
        Err(EmailError::NotConfigured) => return Err(SendEmailError::NotConfigured),
        Err(e) => {
            return Err(SendEmailError::ProviderError(
                anyhow::Error::new(e).context("The email provider rejected the request"),
            ))
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Email sent successfully",
        "data": sent,
    })))
}
