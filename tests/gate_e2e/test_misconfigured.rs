//! E2E tests: empty key set fails closed with a configuration error.

use actix_web::test::TestRequest;

use super::test_helpers::*;

/// No keys configured → 500 with the explicit misconfiguration body,
/// never a 401, even when the client presents a plausible key.
#[actix_rt::test]
async fn test_no_api_keys_configured() {
    let app = create_test_app(&[]).await;

    let (status, body) = json_request(&app, TestRequest::get().uri("/protected/")).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "No API keys configured on the server");

    let req = TestRequest::get()
        .uri("/protected/")
        .insert_header(("X-API-KEY", "looks-like-a-real-key"));
    let (status, body) = json_request(&app, req).await;
    assert_eq!(status, 500, "plausible key must still get 500: {:?}", body);
    assert_eq!(body["error"], "No API keys configured on the server");
}

/// Exempt paths keep working with an empty key set.
#[actix_rt::test]
async fn test_exempt_paths_survive_misconfiguration() {
    let app = create_test_app(&[]).await;

    let (status, body) = json_request(&app, TestRequest::get().uri("/health/")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
}
