use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

use crate::configuration::SiteSettings;
use crate::domain::{EmailAddress, NewsletterSignup};
use crate::email_client::{EmailClient, OutgoingEmail};
use crate::routes::error_chain_fmt;
use crate::templates;
use crate::workflow_client::{WorkflowClient, WorkflowEvent};

#[derive(serde::Deserialize)]
pub struct NewsletterRequest {
    email: Option<String>,
    name: Option<String>,
    source: Option<String>,
}

#[derive(thiserror::Error)]
pub enum NewsletterError {
    #[error("Email is required")]
    MissingEmail,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("We encountered an issue subscribing you to our newsletter. Please try again.")]
    SubscriptionFailed,
}

impl std::fmt::Debug for NewsletterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for NewsletterError {
    fn status_code(&self) -> StatusCode {
        match self {
            NewsletterError::MissingEmail | NewsletterError::InvalidEmail => {
                StatusCode::BAD_REQUEST
            }
            NewsletterError::SubscriptionFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupOutcome {
    email_sent: bool,
    workflow_triggered: bool,
    source: String,
}

impl SignupOutcome {
    fn message(&self) -> Option<&'static str> {
        match (self.email_sent, self.workflow_triggered) {
            (true, true) => Some(
                "Welcome to our newsletter! Check your email for a welcome message and exclusive content.",
            ),
            (true, false) => {
                Some("Welcome to our newsletter! Check your email for a welcome message.")
            }
            (false, true) => Some(
                "You've been subscribed to our newsletter! We'll keep you updated with the latest AI insights.",
            ),
            (false, false) => None,
        }
    }
}

#[tracing::instrument(
    name = "Subscribing to the newsletter",
    skip(body, email_client, workflow_client, site),
    fields(
        subscriber_email = tracing::field::Empty,
        signup_source = tracing::field::Empty
    )
)]
pub async fn subscribe_newsletter(
    body: web::Json<NewsletterRequest>,
    email_client: web::Data<EmailClient>,
    workflow_client: web::Data<WorkflowClient>,
    site: web::Data<SiteSettings>,
) -> Result<HttpResponse, NewsletterError> {
    let NewsletterRequest {
        email,
        name,
        source,
    } = body.into_inner();
    let email = email
        .filter(|e| !e.trim().is_empty())
        .ok_or(NewsletterError::MissingEmail)?;
    let email = EmailAddress::parse(email).map_err(|_| NewsletterError::InvalidEmail)?;
    let signup = NewsletterSignup::new(email, name, source);
    tracing::Span::current()
        .record("subscriber_email", &tracing::field::display(&signup.email))
        .record("signup_source", &tracing::field::display(&signup.source));

    let welcome = templates::newsletter_welcome(&signup, &site);
    let welcome = OutgoingEmail {
        to: signup.email.clone(),
        subject: welcome.subject,
        html: welcome.html,
        text: Some(welcome.text),
        from: None,
    };
    let event = WorkflowEvent::newsletter(&signup);

    // Both side effects run to completion regardless of the other's outcome.
    let (emailed, triggered) = tokio::join!(
        email_client.send_email(&welcome),
        workflow_client.trigger(&event)
    );

    if let Err(e) = &emailed {
        tracing::error!(error.cause_chain = ?e, "Newsletter welcome email failed");
    }
    if let Err(e) = &triggered {
        tracing::error!(error.cause_chain = ?e, "Newsletter workflow webhook failed");
    }

    let outcome = SignupOutcome {
        email_sent: emailed.is_ok(),
        workflow_triggered: triggered.is_ok(),
        source: signup.source,
    };
    let message = outcome.message().ok_or(NewsletterError::SubscriptionFailed)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": message,
        "data": outcome,
    })))
}
