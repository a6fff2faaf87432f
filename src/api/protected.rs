//! A minimal endpoint that requires authentication.

use actix_web::HttpResponse;
use serde::Serialize;

use crate::auth::Authenticated;

#[derive(Serialize)]
struct ProtectedResponse {
    message: &'static str,
    authenticated: bool,
    identity: &'static str,
}

/// Protected endpoint. Requests without a valid API key are rejected by
/// the `Authenticated` extractor with a generic 401.
pub async fn protected(auth: Authenticated) -> HttpResponse {
    HttpResponse::Ok().json(ProtectedResponse {
        message: "You have reached the protected endpoint",
        authenticated: true,
        identity: auth.identity.name,
    })
}
