use crate::helpers::{spawn_app, spawn_app_with, valid_contact};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn contact_returns_200_and_the_message_id_for_valid_input() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(path("/emails"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "msg_1"})))
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.workflow_server)
        .await;

    // Act
    let response = app.post_contact(&valid_contact()).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"ok": true, "messageId": "msg_1"}));
}

#[tokio::test]
async fn contact_notification_is_sent_to_the_business_inbox() {
    let app = spawn_app().await;
    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.workflow_server)
        .await;

    let mut contact = valid_contact();
    contact["name"] = "<script>x</script>Hayden & Co".into();
    contact["message"] = "Line one\nLine two".into();
    app.post_contact(&contact).await;

    let emails = app.sent_emails().await;
    assert_eq!(emails.len(), 1);
    let email = &emails[0];
    assert_eq!(email["to"], serde_json::json!(["haydenashleycpa@outlook.com"]));
    assert_eq!(email["subject"], "AdvisoryAi Website Inquiry");
    assert_eq!(email["from"], "AdvisoryAi <no-reply@advisoryai.co>");
    let html = email["html"].as_str().unwrap();
    assert!(html.contains("<strong>Name:</strong> xHayden &amp; Co"));
    assert!(html.contains("<strong>Phone:</strong> 918-555-0100"));
    assert!(html.contains("Line one<br>Line two"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn contact_triggers_the_contact_workflow() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.workflow_server)
        .await;

    app.post_contact(&valid_contact()).await;

    let events = app.workflow_events().await;
    assert_eq!(events[0]["type"], "contact_form");
    assert_eq!(events[0]["source"], "advisoryai_website");
    assert_eq!(events[0]["data"]["email"], "hayden@example.com");
    assert_eq!(events[0]["data"]["business"], "Ashley CPA");
    assert_eq!(events[0]["data"]["subscribeNewsletter"], false);
}

#[tokio::test]
async fn newsletter_opt_in_is_forwarded_as_a_combined_workflow() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.workflow_server)
        .await;

    let mut contact = valid_contact();
    contact["subscribeNewsletter"] = true.into();
    app.post_contact(&contact).await;

    let events = app.workflow_events().await;
    assert_eq!(events[0]["type"], "contact_with_newsletter");
    assert_eq!(events[0]["data"]["subscribeNewsletter"], true);
}

#[tokio::test]
async fn contact_succeeds_when_the_workflow_webhook_keeps_failing() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;
    // One attempt plus two retries.
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&app.workflow_server)
        .await;

    let response = app.post_contact(&valid_contact()).await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn contact_sends_a_confirmation_when_enabled() {
    let app = spawn_app_with(|c| c.contact.send_confirmation = true).await;
    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.workflow_server)
        .await;

    let response = app.post_contact(&valid_contact()).await;
    assert_eq!(200, response.status().as_u16());

    let emails = app.sent_emails().await;
    let confirmation = emails
        .iter()
        .find(|email| email["to"] == serde_json::json!(["hayden@example.com"]))
        .expect("No confirmation email was sent");
    assert_eq!(confirmation["subject"], "Thank you for contacting AdvisoryAI");
}

#[tokio::test]
async fn contact_returns_400_for_invalid_input() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;
    let test_cases = vec![
        (
            serde_json::json!({"email": "a@example.com", "message": "hi"}),
            "missing name",
        ),
        (
            serde_json::json!({"name": "A", "email": "definitely-not-an-email", "message": "hi"}),
            "invalid email",
        ),
        (
            serde_json::json!({"name": "A", "email": "a@example.com", "message": ""}),
            "empty message",
        ),
        (
            serde_json::json!({"name": "A".repeat(101), "email": "a@example.com", "message": "hi"}),
            "name too long",
        ),
        (
            serde_json::json!({"name": "A", "email": "a@example.com", "message": "m".repeat(1001)}),
            "message too long",
        ),
    ];

    for (body, description) in test_cases {
        let response = app.post_contact(&body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload was {}.",
            description
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid input");
        assert!(body["details"].as_array().map_or(false, |d| !d.is_empty()));
    }
}

#[tokio::test]
async fn contact_returns_400_for_malformed_json() {
    let app = spawn_app().await;

    let response = app.post_raw("/api/contact", "{not json").await;

    assert_eq!(400, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid input");
}

#[tokio::test]
async fn the_sixth_contact_request_within_the_window_is_rejected() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(5)
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.workflow_server)
        .await;

    for i in 0..5 {
        let response = app.post_contact(&valid_contact()).await;
        assert_eq!(200, response.status().as_u16(), "request {} failed", i + 1);
    }
    let response = app.post_contact(&valid_contact()).await;

    assert_eq!(429, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Too many requests. Please try again later.");
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_the_limit() {
    let app = spawn_app_with(|c| c.rate_limit.max_requests = 1).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.workflow_server)
        .await;

    let first = app.post_contact_from("198.51.100.0", &valid_contact()).await;
    assert_eq!(200, first.status().as_u16());

    for i in 1..10 {
        let response = app
            .post_contact_from(&format!("198.51.100.{}", i), &valid_contact())
            .await;
        assert_eq!(
            429,
            response.status().as_u16(),
            "a spoofed X-Forwarded-For of 198.51.100.{} got a fresh window",
            i
        );
    }
}

#[tokio::test]
async fn behind_a_trusted_proxy_rate_limits_apply_per_forwarded_client() {
    let app = spawn_app_with(|c| {
        c.rate_limit.max_requests = 1;
        c.rate_limit.trust_forwarded_headers = true;
    })
    .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.workflow_server)
        .await;

    let first = app.post_contact_from("203.0.113.1", &valid_contact()).await;
    // The proxy appends the real client, so a spoofed leading entry is ignored.
    let second = app
        .post_contact_from("198.51.100.7, 203.0.113.1", &valid_contact())
        .await;
    let other = app.post_contact_from("203.0.113.2", &valid_contact()).await;

    assert_eq!(200, first.status().as_u16());
    assert_eq!(429, second.status().as_u16());
    assert_eq!(200, other.status().as_u16());
}

#[tokio::test]
async fn contact_returns_500_when_the_email_service_is_not_configured() {
    let app = spawn_app_with(|c| c.email_client.authorization_token = None).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app.post_contact(&valid_contact()).await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Email service not configured");
}

#[tokio::test]
async fn contact_returns_500_when_the_provider_fails() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.workflow_server)
        .await;

    let response = app.post_contact(&valid_contact()).await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to send email");
}
