/// Integration tests with mocked external APIs
/// Exercises the email and enrichment clients without hitting real services
use flowmeet_api::config::Config;
use flowmeet_api::enrichment::{EnrichmentProvider, EnrichmentRequest, HttpEnrichmentProvider};
use flowmeet_api::mailer::{EmailMessage, Mailer, ResendMailer};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create test config
fn create_test_config(resend_base_url: String, max_attempts: u32) -> Config {
    let mut config = Config::for_tests();
    config.resend_base_url = resend_base_url;
    config.mail_max_attempts = max_attempts;
    config
}

fn message() -> EmailMessage {
    EmailMessage {
        to: "jane@acme.io".to_string(),
        subject: "Book a meeting".to_string(),
        html: "<p>Hi</p>".to_string(),
    }
}

#[tokio::test]
async fn test_resend_successful_send() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("Authorization", "Bearer re_test"))
        .and(body_partial_json(serde_json::json!({
            "to": "jane@acme.io",
            "subject": "Book a meeting",
            "from": "FlowMeet <noreply@flowmeet.com>"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "em_1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), 3);
    let mailer = ResendMailer::new(&config, "re_test".to_string()).unwrap();

    let result = mailer.send(&message()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_resend_retries_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "em_2" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), 3);
    let mailer = ResendMailer::new(&config, "re_test".to_string())
        .unwrap()
        .with_retry_delay(Duration::from_millis(1));

    assert!(mailer.send(&message()).await.is_ok());
}

#[tokio::test]
async fn test_resend_gives_up_after_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid recipient"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), 2);
    let mailer = ResendMailer::new(&config, "re_test".to_string())
        .unwrap()
        .with_retry_delay(Duration::from_millis(1));

    let err = mailer.send(&message()).await.unwrap_err();
    assert!(err.to_string().contains("422"));
}

#[tokio::test]
async fn test_resend_stops_retrying_when_send_budget_is_spent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(400)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), 20);
    let mailer = ResendMailer::new(&config, "re_test".to_string())
        .unwrap()
        .with_retry_delay(Duration::from_millis(1))
        .with_send_budget(Duration::from_secs(1));

    let started = std::time::Instant::now();
    let err = mailer.send(&message()).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(err.to_string().contains("not sent within"));
}

#[tokio::test]
async fn test_enrichment_lookup_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies"))
        .and(query_param("name", "Acme"))
        .and(query_param("domain", "acme.io"))
        .and(header("Authorization", "Bearer ws-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Acme Inc",
            "annual_revenue": 42000000.0,
            "employee_count": 250,
            "industry": "Software"
        })))
        .mount(&mock_server)
        .await;

    let provider = HttpEnrichmentProvider::new(&mock_server.uri(), Duration::from_secs(2)).unwrap();
    let profile = provider
        .lookup_company(
            EnrichmentRequest {
                company: Some("Acme"),
                email: "jane@acme.io",
            },
            "ws-key",
        )
        .await
        .unwrap();

    assert_eq!(profile.name.as_deref(), Some("Acme Inc"));
    assert_eq!(profile.employee_count, Some(250));
    assert!(profile.is_high_revenue(10_000_000.0));
}

#[tokio::test]
async fn test_enrichment_unknown_company() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let provider = HttpEnrichmentProvider::new(&mock_server.uri(), Duration::from_secs(2)).unwrap();
    let profile = provider
        .lookup_company(
            EnrichmentRequest {
                company: Some("Nobody"),
                email: "x@nobody.dev",
            },
            "ws-key",
        )
        .await
        .unwrap();

    assert!(!profile.is_high_revenue(0.0));
}

#[tokio::test]
async fn test_enrichment_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/companies"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let provider = HttpEnrichmentProvider::new(&mock_server.uri(), Duration::from_secs(2)).unwrap();
    let result = provider
        .lookup_company(
            EnrichmentRequest {
                company: Some("Acme"),
                email: "jane@acme.io",
            },
            "ws-key",
        )
        .await;

    assert!(result.is_err());
}
