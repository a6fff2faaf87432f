//! E2E tests: every credential transport against the protected endpoint.

use actix_web::http::header;
use actix_web::test::TestRequest;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::test_helpers::*;

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{}:{}", user, password)))
}

/// (1) No credential at all → generic 401.
#[actix_rt::test]
async fn test_unauthenticated_request() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;
    let (status, body) = json_request(&app, TestRequest::get().uri("/protected/")).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "API key missing or invalid");
}

/// (2) X-API-KEY header: both configured keys work, a wrong key does not.
#[actix_rt::test]
async fn test_x_api_key_header() {
    let app = create_test_app(&[TEST_API_KEY_1, TEST_API_KEY_2]).await;

    for key in [TEST_API_KEY_1, TEST_API_KEY_2] {
        let req = TestRequest::get()
            .uri("/protected/")
            .insert_header(("X-API-KEY", key));
        let (status, body) = json_request(&app, req).await;
        assert_eq!(status, 200, "key {} should authenticate: {:?}", key, body);
        assert_eq!(body["authenticated"], true);
    }

    let req = TestRequest::get()
        .uri("/protected/")
        .insert_header(("X-API-KEY", "invalid-key"));
    let (status, _) = json_request(&app, req).await;
    assert_eq!(status, 401);
}

/// (3) One-character alteration of a valid key is rejected.
#[actix_rt::test]
async fn test_almost_valid_key_is_rejected() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    let mut altered = TEST_API_KEY_1.to_string();
    altered.pop();
    altered.push('9');

    let req = TestRequest::get()
        .uri("/protected/")
        .insert_header(("X-API-KEY", altered));
    let (status, body) = json_request(&app, req).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "API key missing or invalid");
}

/// (4) Authorization: ApiKey <key>.
#[actix_rt::test]
async fn test_authorization_header_apikey() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    let req = TestRequest::get()
        .uri("/protected/")
        .insert_header((header::AUTHORIZATION, format!("ApiKey {}", TEST_API_KEY_1)));
    let (status, _) = json_request(&app, req).await;
    assert_eq!(status, 200);

    let req = TestRequest::get()
        .uri("/protected/")
        .insert_header((header::AUTHORIZATION, "ApiKey invalid-key"));
    let (status, _) = json_request(&app, req).await;
    assert_eq!(status, 401);
}

/// (5) Basic auth: the password half is the key, the username is ignored.
#[actix_rt::test]
async fn test_basic_auth() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    for user in ["username", "n8n", "someone-else"] {
        let req = TestRequest::get()
            .uri("/protected/")
            .insert_header((header::AUTHORIZATION, basic(user, TEST_API_KEY_1)));
        let (status, body) = json_request(&app, req).await;
        assert_eq!(status, 200, "user {:?} should not matter: {:?}", user, body);
    }

    let req = TestRequest::get()
        .uri("/protected/")
        .insert_header((header::AUTHORIZATION, basic("username", "invalid-key")));
    let (status, _) = json_request(&app, req).await;
    assert_eq!(status, 401);
}

/// (6) Malformed Basic payloads are "no credential", which the protected
/// endpoint then rejects - never a 500.
#[actix_rt::test]
async fn test_malformed_basic_auth() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    for auth in [
        "Basic not!!valid-base64".to_string(),
        format!("Basic {}", BASE64.encode("no-colon-here")),
    ] {
        let req = TestRequest::get()
            .uri("/protected/")
            .insert_header((header::AUTHORIZATION, auth.clone()));
        let (status, _) = json_request(&app, req).await;
        assert_eq!(status, 401, "malformed auth {:?} should yield 401", auth);
    }
}

/// (7) Query parameter transport.
#[actix_rt::test]
async fn test_query_parameter() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    let req = TestRequest::get().uri(&format!("/protected/?api_key={}", TEST_API_KEY_1));
    let (status, _) = json_request(&app, req).await;
    assert_eq!(status, 200);

    let req = TestRequest::get().uri("/protected/?api_key=invalid-key");
    let (status, _) = json_request(&app, req).await;
    assert_eq!(status, 401);
}

/// (8) Body field transport, JSON and form.
#[actix_rt::test]
async fn test_body_field() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    let req = TestRequest::post()
        .uri("/protected/")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(format!(r#"{{"api_key": "{}"}}"#, TEST_API_KEY_1));
    let (status, body) = json_request(&app, req).await;
    assert_eq!(status, 200, "JSON body key should authenticate: {:?}", body);

    let req = TestRequest::post()
        .uri("/protected/")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(format!("api_key={}", TEST_API_KEY_1));
    let (status, _) = json_request(&app, req).await;
    assert_eq!(status, 200);

    let req = TestRequest::post()
        .uri("/protected/")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"api_key": "invalid-key"}"#);
    let (status, _) = json_request(&app, req).await;
    assert_eq!(status, 401);
}

/// (9) Precedence: a valid dedicated header wins over an invalid query key.
#[actix_rt::test]
async fn test_header_precedence_over_query() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    let req = TestRequest::get()
        .uri("/protected/?api_key=invalid-key")
        .insert_header(("X-API-KEY", TEST_API_KEY_1));
    let (status, body) = json_request(&app, req).await;
    assert_eq!(status, 200, "header should win: {:?}", body);
}

/// (10) And the reverse: an invalid header is not rescued by a valid
/// query key - extraction stops at the first source that yields a value.
#[actix_rt::test]
async fn test_invalid_header_not_rescued_by_query() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    let req = TestRequest::get()
        .uri(&format!("/protected/?api_key={}", TEST_API_KEY_1))
        .insert_header(("X-API-KEY", "invalid-key"));
    let (status, _) = json_request(&app, req).await;
    assert_eq!(status, 401);
}

/// (11) Success body shape.
#[actix_rt::test]
async fn test_protected_response_shape() {
    let app = create_test_app(&[TEST_API_KEY_1]).await;

    let req = TestRequest::get()
        .uri("/protected/")
        .insert_header(("X-API-KEY", TEST_API_KEY_1));
    let (status, body) = json_request(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["identity"], "admin");
    assert!(body["message"].is_string());
}
