use std::sync::{Arc, Mutex};
use std::time::Duration;

use nf_sbi::clients::{RequestContext, SbiClient};
use nf_sbi::metrics::RequestMetrics;
use nf_sbi::types::{
    ErrorKind, NfProfile, NfRegistrationData, NfRegistrationResponse, NfStatus, NfType,
};
use serde_json::json;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE: &str = "amf";

fn client() -> (SbiClient, Arc<RequestMetrics>) {
    let metrics = Arc::new(RequestMetrics::new());
    let client = SbiClient::new(SERVICE, Duration::from_secs(5)).with_metrics(metrics.clone());
    (client, metrics)
}

fn registration_data(id: &str) -> NfRegistrationData {
    let mut profile = NfProfile::new(id, NfType::Amf, NfStatus::Registered);
    profile.ipv4_addresses = vec!["10.0.0.5".to_string()];
    NfRegistrationData { nf_profile: profile }
}

#[tokio::test]
async fn test_register_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nf-instances/abc"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"nfInstanceId": "abc", "heartbeatTimer": 30})),
        )
        .mount(&server)
        .await;

    let (client, metrics) = client();
    let url = format!("{}/nf-instances/abc", server.uri());
    let response: Option<NfRegistrationResponse> = client
        .post(&RequestContext::background(), &url, &registration_data("abc"))
        .await
        .unwrap();

    assert_eq!(
        response,
        Some(NfRegistrationResponse {
            nf_instance_id: "abc".to_string(),
            heartbeat_timer: 30,
        })
    );
    assert_eq!(metrics.request_count(SERVICE, "POST", "201"), 1);
}

#[tokio::test]
async fn test_register_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nf-instances/abc"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "already registered"})))
        .mount(&server)
        .await;

    let (client, metrics) = client();
    let url = format!("{}/nf-instances/abc", server.uri());
    let err = client
        .post::<_, NfRegistrationResponse>(&RequestContext::background(), &url, &registration_data("abc"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "CONFLICT: already registered");
    assert_eq!(err.status_code(), 409);
    assert_eq!(metrics.request_count(SERVICE, "POST", "409"), 1);
}

#[tokio::test]
async fn test_error_statuses_are_classified() {
    let cases = [
        (400u16, ErrorKind::BadRequest, 400u16),
        (401, ErrorKind::Unauthorized, 401),
        (403, ErrorKind::Forbidden, 403),
        (404, ErrorKind::NotFound, 404),
        (409, ErrorKind::Conflict, 409),
        (408, ErrorKind::Timeout, 504),
        (504, ErrorKind::Timeout, 504),
        (429, ErrorKind::Internal, 500),
        (500, ErrorKind::Internal, 500),
        (503, ErrorKind::Internal, 500),
    ];

    let server = MockServer::start().await;
    for (status, _, _) in cases {
        Mock::given(method("GET"))
            .and(path(format!("/status/{}", status)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"message": "peer says no"})))
            .mount(&server)
            .await;
    }

    let (client, _) = client();
    for (status, kind, reported) in cases {
        let url = format!("{}/status/{}", server.uri(), status);
        let err = client
            .get::<serde_json::Value>(&RequestContext::background(), &url)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), kind, "status {}", status);
        assert_eq!(err.status_code(), reported, "status {}", status);
        assert_eq!(err.text(), "peer says no");
    }
}

#[tokio::test]
async fn test_no_content_leaves_target_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (client, metrics) = client();
    let response: Option<NfRegistrationResponse> = client
        .post(&RequestContext::background(), &server.uri(), &registration_data("abc"))
        .await
        .unwrap();

    assert!(response.is_none());
    assert_eq!(metrics.request_count(SERVICE, "POST", "204"), 1);
}

#[tokio::test]
async fn test_repeated_get_is_stable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nf-instances/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nfInstanceId": "abc",
            "nfType": "AMF",
            "nfStatus": "REGISTERED",
            "heartbeatTimer": 30
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (client, metrics) = client();
    let ctx = RequestContext::background();
    let url = format!("{}/nf-instances/abc", server.uri());

    let first: Option<NfProfile> = client.get(&ctx, &url).await.unwrap();
    let second: Option<NfProfile> = client.get(&ctx, &url).await.unwrap();

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(metrics.request_count(SERVICE, "GET", "200"), 2);
}

#[tokio::test]
async fn test_cancelled_context_makes_no_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let (ctx, handle) = RequestContext::with_cancel();
    handle.cancel();

    let (client, metrics) = client();
    let err = client
        .get::<serde_json::Value>(&ctx, &server.uri())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("(caused by: context canceled)"));
    assert_eq!(metrics.request_count(SERVICE, "GET", "error"), 1);
    assert_eq!(metrics.request_count(SERVICE, "GET", "200"), 0);
    assert!(metrics.duration(SERVICE, "GET").is_none());
}

#[tokio::test]
async fn test_deadline_during_request_is_internal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let ctx = RequestContext::background().with_timeout(Duration::from_millis(50));
    let (client, metrics) = client();
    let err = client
        .get::<serde_json::Value>(&ctx, &server.uri())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("context deadline exceeded"));
    assert_eq!(metrics.request_count(SERVICE, "GET", "error"), 1);
}

#[tokio::test]
async fn test_client_timeout_is_internal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let metrics = Arc::new(RequestMetrics::new());
    let client = SbiClient::new(SERVICE, Duration::from_millis(50)).with_metrics(metrics.clone());
    let err = client
        .get::<serde_json::Value>(&RequestContext::background(), &server.uri())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(metrics.request_count(SERVICE, "GET", "error"), 1);
}

#[tokio::test]
async fn test_connection_refused_is_internal() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (client, metrics) = client();
    let err = client
        .delete(&RequestContext::background(), &format!("http://{}/nf-instances/abc", addr))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().starts_with("INTERNAL: Failed to execute request to http://"));
    assert_eq!(metrics.request_count(SERVICE, "DELETE", "error"), 1);
}

#[tokio::test]
async fn test_concurrent_calls_share_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(16)
        .mount(&server)
        .await;

    let (client, metrics) = client();
    let mut tasks = Vec::new();
    for _ in 0..16 {
        let client = client.clone();
        let url = server.uri();
        tasks.push(tokio::spawn(async move {
            client
                .get::<serde_json::Value>(&RequestContext::background(), &url)
                .await
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), Some(json!({"ok": true})));
    }

    assert_eq!(metrics.request_count(SERVICE, "GET", "200"), 16);
}

#[derive(Clone, Default)]
struct RequestEvents(Arc<Mutex<Vec<Vec<(String, String)>>>>);

struct FieldCollector(Vec<(String, String)>);

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> Layer<S> for RequestEvents {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector(Vec::new());
        event.record(&mut fields);
        let is_request = fields
            .0
            .iter()
            .any(|(name, value)| name == "message" && value == "SBI request");
        if is_request {
            self.0.lock().unwrap().push(fields.0);
        }
    }
}

#[tokio::test]
async fn test_one_debug_event_per_attempt() {
    let events = RequestEvents::default();
    let subscriber = tracing_subscriber::registry().with(events.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (client, _) = client();
    let _ = client
        .put::<_, serde_json::Value>(&RequestContext::background(), &server.uri(), &json!({}))
        .await;

    let recorded = events.0.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    let fields = &recorded[0];
    let field = |name: &str| {
        fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(field("method").as_deref(), Some("PUT"));
    assert_eq!(field("status").as_deref(), Some("404"));
    assert!(field("url").unwrap().starts_with("http://"));
    assert!(field("duration").is_some());
}
