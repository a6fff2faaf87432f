//! Credential extraction and the `Authenticated` request extractor.
//!
//! # Security
//! - Extracted key material is compared constant-time by `ApiKeySet`
//! - Malformed credentials (bad base64, bad UTF-8) are logged and treated
//!   as "no credential found" - extraction never fails a request by itself
//! - Keys are never logged

use std::fmt;
use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::{Method, StatusCode, header};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, warn};

use super::RequestIdentity;
use crate::config::{API_KEY_HEADER, API_KEY_PARAM};
use crate::error::ErrorBody;

/// Where a candidate credential was found. Used for logging only;
/// validation treats all sources identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `X-API-KEY` header
    DedicatedHeader,
    /// `Authorization: ApiKey <key>`
    AuthorizationApiKey,
    /// `Authorization: Basic base64(user:<key>)` - password half
    AuthorizationBasic,
    /// `?api_key=` query parameter
    QueryParam,
    /// `api_key` field of a JSON or urlencoded body
    BodyField,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DedicatedHeader => "x-api-key header",
            Self::AuthorizationApiKey => "authorization apikey scheme",
            Self::AuthorizationBasic => "authorization basic password",
            Self::QueryParam => "query parameter",
            Self::BodyField => "body field",
        };
        f.write_str(name)
    }
}

/// Locate a candidate API key on the request, trying sources in fixed
/// priority order and stopping at the first that yields a non-empty value:
///
/// 1. `X-API-KEY` header
/// 2. `Authorization: ApiKey <key>`
/// 3. `Authorization: Basic ...` (password component)
/// 4. `api_key` query parameter
/// 5. `api_key` body field (JSON or form bodies only)
///
/// Returns `None` when no credential is present - a distinct outcome from
/// "found but invalid", which only the validator can decide.
///
/// Reading the body field drains `payload` and replaces it with an
/// in-memory copy, so downstream extractors still see the full body.
pub async fn extract_credential(
    req: &HttpRequest,
    payload: &mut Payload,
) -> Option<(String, CredentialSource)> {
    if let Some(key) = header_value(req, API_KEY_HEADER) {
        return Some((key, CredentialSource::DedicatedHeader));
    }
    if let Some(key) = authorization_api_key(req) {
        return Some((key, CredentialSource::AuthorizationApiKey));
    }
    if let Some(key) = authorization_basic_password(req) {
        return Some((key, CredentialSource::AuthorizationBasic));
    }
    if let Some(key) = find_pair(req.query_string(), API_KEY_PARAM) {
        return Some((key, CredentialSource::QueryParam));
    }
    if let Some(key) = body_field(req, payload, API_KEY_PARAM).await {
        return Some((key, CredentialSource::BodyField));
    }
    None
}

/// Read a header as a non-empty string. Invalid UTF-8 is logged and skipped.
fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    let value = req.headers().get(name)?;
    match value.to_str() {
        Ok(s) if !s.is_empty() => Some(s.to_string()),
        Ok(_) => None,
        Err(_) => {
            debug!("header {} is not valid UTF-8; skipping", name);
            None
        }
    }
}

/// `Authorization: ApiKey <key>` - the remainder after the first space.
fn authorization_api_key(req: &HttpRequest) -> Option<String> {
    let auth = header_value(req, header::AUTHORIZATION.as_str())?;
    let (scheme, rest) = auth.split_once(' ')?;
    if scheme != "ApiKey" || rest.is_empty() {
        return None;
    }
    Some(rest.to_string())
}

/// `Authorization: Basic base64(user:password)` - the password half is the
/// candidate key; the username is ignored. Malformed payloads are logged
/// and treated as "no credential found", never as an error.
fn authorization_basic_password(req: &HttpRequest) -> Option<String> {
    let auth = header_value(req, header::AUTHORIZATION.as_str())?;
    let (scheme, rest) = auth.split_once(' ')?;
    if scheme != "Basic" {
        return None;
    }

    let decoded = match BASE64.decode(rest.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("failed to decode basic auth payload: {}", e);
            return None;
        }
    };
    let decoded = match String::from_utf8(decoded) {
        Ok(s) => s,
        Err(e) => {
            warn!("basic auth payload is not valid UTF-8: {}", e);
            return None;
        }
    };

    match decoded.split_once(':') {
        Some((_user, password)) if !password.is_empty() => Some(password.to_string()),
        Some(_) => None,
        None => {
            debug!("basic auth payload has no ':' separator");
            None
        }
    }
}

/// Find `name` in an urlencoded pair list (query string or form body).
fn find_pair(pairs: &str, name: &str) -> Option<String> {
    for pair in pairs.split('&') {
        let (key, value) = match pair.split_once('=') {
            Some(kv) => kv,
            None => continue,
        };
        if key != name {
            continue;
        }
        match urlencoding::decode(value) {
            Ok(decoded) if !decoded.is_empty() => return Some(decoded.into_owned()),
            Ok(_) => return None,
            Err(e) => {
                debug!("failed to percent-decode {} parameter: {}", name, e);
                return None;
            }
        }
    }
    None
}

/// Look for `name` in a parsed request body. Only methods that carry
/// bodies are considered, and only JSON and urlencoded form payloads.
async fn body_field(req: &HttpRequest, payload: &mut Payload, name: &str) -> Option<String> {
    if !matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH) {
        return None;
    }

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)?
        .to_str()
        .ok()?
        .to_ascii_lowercase();
    let is_json = content_type.starts_with("application/json");
    let is_form = content_type.starts_with("application/x-www-form-urlencoded");
    if !is_json && !is_form {
        return None;
    }

    let body = match web::Bytes::from_request(req, payload).await {
        Ok(body) => body,
        Err(e) => {
            warn!("failed to buffer request body for credential lookup: {}", e);
            return None;
        }
    };
    // Hand the handler an in-memory copy of what we just consumed.
    *payload = bytes_to_payload(body.clone());

    if is_json {
        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(value) => value
                .get(name)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            Err(e) => {
                debug!("request body is not valid JSON: {}", e);
                None
            }
        }
    } else {
        std::str::from_utf8(&body)
            .ok()
            .and_then(|text| find_pair(text, name))
    }
}

/// Rebuild a payload from buffered bytes.
fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = actix_http::h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}

/// Authentication error for the `Authenticated` extractor.
#[derive(Debug)]
pub struct AuthError;

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("API key missing or invalid")
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorBody {
            error: "API key missing or invalid".to_string(),
        })
    }
}

/// Extractor that requires the request to have been authenticated by the
/// gate middleware. Anonymous requests (no credential presented on a
/// non-exempt path) reach the handler without an identity; handlers that
/// cannot tolerate anonymous access take this extractor and get a 401.
///
/// ```ignore
/// async fn protected_handler(auth: Authenticated) -> impl Responder {
///     // auth.identity is the fixed administrative principal
/// }
/// ```
pub struct Authenticated {
    pub identity: RequestIdentity,
}

impl FromRequest for Authenticated {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<RequestIdentity>().cloned();
        match identity {
            Some(identity) => ready(Ok(Authenticated { identity })),
            None => ready(Err(AuthError)),
        }
    }
}
