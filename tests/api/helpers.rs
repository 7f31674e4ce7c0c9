use advisoryai::configuration::{get_configuration, Settings};
use advisoryai::startup::Application;
use advisoryai::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use secrecy::Secret;
use wiremock::MockServer;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub email_server: MockServer,
    pub workflow_server: MockServer,
    api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}{}", &self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/api/contact", body).await
    }

    pub async fn post_contact_from(
        &self,
        client_ip: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/contact", &self.address))
            .header("X-Forwarded-For", client_ip)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}{}", &self.address, path))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_newsletter(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/api/newsletter", body).await
    }

    pub async fn post_send_email(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/api/email/send", body).await
    }

    pub async fn post_workflow_test(&self) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/workflow/test", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// JSON bodies of every request the email provider received.
    pub async fn sent_emails(&self) -> Vec<serde_json::Value> {
        received_bodies(&self.email_server).await
    }

    /// JSON bodies of every request the workflow webhook received.
    pub async fn workflow_events(&self) -> Vec<serde_json::Value> {
        received_bodies(&self.workflow_server).await
    }
}

async fn received_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

pub fn valid_contact() -> serde_json::Value {
    serde_json::json!({
        "name": "Hayden Ashley",
        "email": "hayden@example.com",
        "phone": "918-555-0100",
        "business": "Ashley CPA",
        "message": "We'd like to automate our client intake.",
    })
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with<F>(customize: F) -> TestApp
where
    F: FnOnce(&mut Settings),
{
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let workflow_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a random OS port
        c.application.port = 0;
        c.email_client.base_url = email_server.uri();
        c.email_client.authorization_token = Some(Secret::new("re_test_key".to_string()));
        c.email_client.timeout_milliseconds = 2000;
        c.workflow.webhook_url = Some(workflow_server.uri());
        c.workflow.base_backoff_milliseconds = 1;
        c.workflow.timeout_milliseconds = 2000;
        c.contact.send_confirmation = false;
        customize(&mut c);
        c
    };

    let application = Application::build(configuration)
        .await
        .expect("Failed to build application.");
    let port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        email_server,
        workflow_server,
        api_client: reqwest::Client::new(),
    }
}
