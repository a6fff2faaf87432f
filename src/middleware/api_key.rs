//! API key gate middleware.
//!
//! Decides whether a request may proceed, in fixed order:
//!
//! 1. global auth-disable switch (explicit, development only) - pass
//! 2. exempt path - pass
//! 3. request already carries an identity - pass
//! 4. empty key set - 500 configuration error, fail closed
//! 5. no credential presented - pass through anonymously; handlers that
//!    need an identity reject via the `Authenticated` extractor
//! 6. credential presented - constant-time check against the key set;
//!    match attaches the fixed identity, mismatch is a generic 401
//!
//! The 401 body never says which check failed, so a client cannot
//! distinguish "wrong key" from "no key".

use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use tracing::{debug, error, warn};

use crate::auth::{GatePolicy, RequestIdentity, extract_credential};
use crate::error::AppError;

/// API key gate middleware factory.
pub struct ApiKeyGate {
    policy: Arc<GatePolicy>,
}

impl ApiKeyGate {
    pub fn new(policy: Arc<GatePolicy>) -> Self {
        Self { policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyGateMiddleware {
            service: Rc::new(service),
            policy: Arc::clone(&self.policy),
        }))
    }
}

/// API key gate middleware service.
pub struct ApiKeyGateMiddleware<S> {
    service: Rc<S>,
    policy: Arc<GatePolicy>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let policy = Arc::clone(&self.policy);

        Box::pin(async move {
            if policy.auth_disabled {
                debug!("API key authentication disabled by configuration");
                req.extensions_mut().insert(RequestIdentity::admin());
                return pass(service, req).await;
            }

            if policy.exempt.matches(req.path()) {
                return pass(service, req).await;
            }

            // Idempotent re-entry: something earlier already authenticated it.
            let already_authenticated = req.extensions().get::<RequestIdentity>().is_some();
            if already_authenticated {
                return pass(service, req).await;
            }

            if policy.keys.is_empty() {
                error!(path = %req.path(), "no API keys configured; refusing request");
                let res = req.into_response(AppError::Misconfigured.error_response());
                return Ok(res.map_into_right_body());
            }

            // Credential extraction may need to buffer the body; split the
            // request apart and put it back together afterwards.
            let (http_req, mut payload) = req.into_parts();
            let found = extract_credential(&http_req, &mut payload).await;
            let req = ServiceRequest::from_parts(http_req, payload);

            match found {
                None => {
                    // Anonymous: no identity attached. Whether that is
                    // acceptable is the handler's decision, not ours.
                    debug!(path = %req.path(), "no API key presented; continuing anonymously");
                    pass(service, req).await
                }
                Some((candidate, source)) => {
                    if policy.keys.contains(&candidate) {
                        debug!(path = %req.path(), source = %source, "API key accepted");
                        req.extensions_mut().insert(RequestIdentity::admin());
                        pass(service, req).await
                    } else {
                        warn!(path = %req.path(), source = %source, "invalid API key");
                        let res = req.into_response(AppError::Unauthorized.error_response());
                        Ok(res.map_into_right_body())
                    }
                }
            }
        })
    }
}

async fn pass<S, B>(
    service: Rc<S>,
    req: ServiceRequest,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
{
    service.call(req).await.map(|res| res.map_into_left_body())
}
