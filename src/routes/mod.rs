mod contact;
mod health_check;
mod newsletter;
mod send_email;

pub use contact::*;
pub use health_check::*;
pub use newsletter::*;
pub use send_email::*;
pub use workflow_test::*;

use actix_web::{error::InternalError, HttpRequest, HttpResponse};

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

/// Malformed JSON bodies answer `{"success": false, "error": ..}` instead of
/// actix's plain-text default.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    req: &HttpRequest,
) -> actix_web::Error {
    tracing::warn!(path = %req.path(), error = %err, "Rejected malformed JSON body");
    let response = HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": "Invalid request body"
    }));
    InternalError::from_response(err, response).into()
}
