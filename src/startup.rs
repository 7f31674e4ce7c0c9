use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use crate::configuration::{Settings, SiteSettings};
use crate::email_client::EmailClient;
use crate::rate_limit::{enforce_rate_limit, RateLimiter};
use crate::routes::{
    contact, contact_json_error_handler, health_check, json_error_handler, send_email,
    subscribe_newsletter, test_workflow, ContactInbox,
};
use crate::workflow_client::WorkflowClient;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let email_client = EmailClient::new(
            configuration.email_client.base_url.clone(),
            configuration.email_client.sender_email.clone(),
            configuration.email_client.authorization_token.clone(),
            configuration.email_client.timeout(),
        )
        .context("Failed to build the email provider client")?;
        if !email_client.is_configured() {
            tracing::warn!("Email provider API key not configured, emails will not be sent");
        }

        let workflow_client = WorkflowClient::new(
            configuration.workflow.webhook_url.clone(),
            configuration.workflow.source.clone(),
            configuration.workflow.max_retries,
            configuration.workflow.base_backoff(),
            configuration.workflow.timeout(),
        )
        .context("Failed to build the workflow webhook client")?;

        let inbox = ContactInbox::from_settings(&configuration.contact)
            .map_err(anyhow::Error::msg)
            .context("Invalid contact recipient in configuration")?;
        let rate_limiter = RateLimiter::from_settings(&configuration.rate_limit);

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            email_client,
            workflow_client,
            rate_limiter,
            inbox,
            configuration.site,
        )?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    workflow_client: WorkflowClient,
    rate_limiter: RateLimiter,
    inbox: ContactInbox,
    site: SiteSettings,
) -> Result<Server, std::io::Error> {
    let email_client = Data::new(email_client);
    let workflow_client = Data::new(workflow_client);
    // Shared by every worker so a client is counted once, not once per thread.
    let rate_limiter = Data::new(rate_limiter);
    let inbox = Data::new(inbox);
    let site = Data::new(site);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/api/contact")
                    .app_data(web::JsonConfig::default().error_handler(contact_json_error_handler))
                    .wrap(from_fn(enforce_rate_limit))
                    .route(web::post().to(contact)),
            )
            .route("/api/newsletter", web::post().to(subscribe_newsletter))
            .route("/api/email/send", web::post().to(send_email))
            .route("/api/workflow/test", web::post().to(test_workflow))
            .app_data(email_client.clone())
            .app_data(workflow_client.clone())
            .app_data(rate_limiter.clone())
            .app_data(inbox.clone())
            .app_data(site.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
