//! Drives [`NominatimResolver`] against a throwaway local HTTP server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use tamaod_geocoder::{CoordinateResolver, NominatimConfig, NominatimResolver};
use tamaod_models::{Coordinate, RetrievalError, Service};

#[derive(Debug, Clone)]
struct SeenRequest {
    params: HashMap<String, String>,
    user_agent: Option<String>,
    referer: Option<String>,
}

type Seen = Arc<Mutex<Vec<SeenRequest>>>;

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Starts a server answering every request with `status` and `body`
/// after `delay`, and returns the search URL plus the recorded requests.
fn serve(status: u16, body: &'static str, delay: Duration) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let server = HttpServer::new(move || {
        let recorder = recorder.clone();
        App::new().default_service(web::to(move |req: HttpRequest| {
            let recorder = recorder.clone();
            async move {
                let params = web::Query::<HashMap<String, String>>::from_query(req.query_string())
                    .map(web::Query::into_inner)
                    .unwrap_or_default();
                recorder.lock().unwrap().push(SeenRequest {
                    params,
                    user_agent: header(&req, "user-agent"),
                    referer: header(&req, "referer"),
                });
                actix_rt::time::sleep(delay).await;
                HttpResponse::build(StatusCode::from_u16(status).unwrap())
                    .content_type("application/json")
                    .body(body)
            }
        }))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());

    (format!("http://{addr}/search"), seen)
}

fn resolver(base_url: &str) -> NominatimResolver {
    let config = NominatimConfig::new("tamaod-tests (ops@example.org)", "http://test-referrer")
        .unwrap()
        .with_base_url(base_url);
    NominatimResolver::new(config)
}

const ONE_CANDIDATE: &str = r#"[{
    "place_id": 194616086,
    "licence": "Data © OpenStreetMap contributors",
    "osm_type": "node",
    "osm_id": 2079017757,
    "lat": "32.0698820",
    "lon": "34.7735910",
    "class": "place",
    "type": "house",
    "display_name": "23, מרכז בעלי מלאכה, תל־אביב–יפו, ישראל"
}]"#;

#[actix_rt::test]
async fn resolves_first_candidate_and_sends_policy_headers() {
    let (url, seen) = serve(200, ONE_CANDIDATE, Duration::ZERO);

    let coordinate = resolver(&url).fetch("Herzl", "10").await.unwrap();
    assert_eq!(coordinate, Coordinate::new(34.773_591_0, 32.069_882_0));

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.params.get("q").map(String::as_str), Some("Herzl 10 תל אביב"));
    assert_eq!(request.params.get("format").map(String::as_str), Some("json"));
    assert_eq!(
        request.user_agent.as_deref(),
        Some("tamaod-tests (ops@example.org)")
    );
    assert_eq!(request.referer.as_deref(), Some("http://test-referrer"));
}

#[actix_rt::test]
async fn empty_result_cannot_locate_address() {
    let (url, _) = serve(200, "[]", Duration::ZERO);

    let err = resolver(&url).fetch("FakeStreet", "9999").await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().contains("could not locate address"));
}

#[actix_rt::test]
async fn http_error_carries_status_and_reason() {
    let (url, _) = serve(500, "Internal Server Error", Duration::ZERO);

    let err = resolver(&url).fetch("BuggyStreet", "1").await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert_eq!(
        err.to_string(),
        "Nominatim API error: 500 Internal Server Error"
    );
}

#[actix_rt::test]
async fn invalid_json_is_reported() {
    let (url, _) = serve(200, "{ not valid json", Duration::ZERO);

    let err = resolver(&url).fetch("CorruptStreet", "2").await.unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().contains("invalid JSON response from Nominatim"));
}

#[actix_rt::test]
async fn partial_coordinates_use_first_valid_candidate() {
    let body = r#"[
        { "place_id": 1, "display_name": "Place without coords" },
        { "place_id": 2, "lat": "32.0698820", "lon": "34.7735910", "display_name": "Place with coords" }
    ]"#;
    let (url, _) = serve(200, body, Duration::ZERO);

    let coordinate = resolver(&url).fetch("TestStreet", "123").await.unwrap();
    assert_eq!(coordinate, Coordinate::new(34.773_591_0, 32.069_882_0));
}

#[actix_rt::test]
async fn candidates_without_coordinates_are_an_error() {
    let (url, _) = serve(
        200,
        r#"[{ "place_id": 194616086, "display_name": "Some Place" }]"#,
        Duration::ZERO,
    );

    let err = resolver(&url).fetch("TestStreet", "123").await.unwrap_err();
    assert_eq!(
        err,
        RetrievalError::NoCoordinates {
            service: Service::Nominatim
        }
    );
}

#[actix_rt::test]
async fn timeout_is_a_request_failure() {
    let (url, _) = serve(200, ONE_CANDIDATE, Duration::from_millis(750));
    let config = NominatimConfig::new("tamaod-tests", "http://test-referrer")
        .unwrap()
        .with_base_url(url)
        .with_timeout(Duration::from_millis(100));

    let err = NominatimResolver::new(config)
        .fetch("TimeoutStreet", "3")
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::Request { .. }), "{err:?}");
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().contains("Nominatim request failed"));
}

#[actix_rt::test]
async fn connection_refused_is_a_request_failure() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let err = resolver(&format!("http://{addr}/search"))
        .fetch("Herzl", "10")
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::Request { .. }), "{err:?}");
}
