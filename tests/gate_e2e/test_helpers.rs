//! Shared helpers for the gate E2E tests.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::{BoxBody, EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, Error, test, web};

use keygate_lib::api;
use keygate_lib::auth::{ApiKeySet, ExemptPaths, GatePolicy};
use keygate_lib::db::ProbeHandle;
use keygate_lib::middleware::ApiKeyGate;
use keygate_lib::routes::RouteRegistry;

pub const TEST_API_KEY_1: &str = "test-api-key-123";
pub const TEST_API_KEY_2: &str = "test-api-key-456";

pub const DEFAULT_EXEMPT: &[&str] = &["/health", "/debug", "/test/async-example"];

/// Build an in-process app with the given allow-list and default exemptions.
pub async fn create_test_app(
    keys: &[&str],
) -> impl Service<Request, Response = ServiceResponse<EitherBody<BoxBody>>, Error = Error> {
    create_test_app_with(keys, DEFAULT_EXEMPT, false).await
}

/// Build an in-process app with full control over the gate policy.
pub async fn create_test_app_with(
    keys: &[&str],
    exempt: &[&str],
    auth_disabled: bool,
) -> impl Service<Request, Response = ServiceResponse<EitherBody<BoxBody>>, Error = Error> {
    let mut registry = RouteRegistry::new();
    api::declare_routes(&mut registry);
    registry.activate();
    let registry = Arc::new(registry);

    let policy = Arc::new(GatePolicy {
        keys: ApiKeySet::new(keys.iter().map(|k| k.to_string())),
        exempt: ExemptPaths::new(exempt.iter().map(|p| p.to_string())),
        auth_disabled,
    });

    test::init_service(
        App::new()
            .wrap(ApiKeyGate::new(policy))
            .app_data(web::Data::from(Arc::clone(&registry)))
            .app_data(web::Data::new(ProbeHandle::disconnected()))
            .configure(|cfg| registry.configure(cfg)),
    )
    .await
}

/// Send a request and return (status, parsed JSON body).
pub async fn json_request<S, B>(app: &S, req: test::TestRequest) -> (u16, serde_json::Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let body = test::read_body(res).await;
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}
