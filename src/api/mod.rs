//! API endpoint modules.

pub mod debug;
pub mod demo;
pub mod health;
pub mod protected;

use actix_web::http::Method;

use crate::routes::RouteRegistry;

/// Declare every endpoint into the registry. Call before `activate`.
pub fn declare_routes(registry: &mut RouteRegistry) {
    registry.declare("/health/", &[Method::GET], "health", health::health);
    registry.declare("/debug/", &[Method::GET], "debug", debug::debug_info);
    registry.declare(
        "/test/async-example/",
        &[Method::GET],
        "async_example",
        demo::async_example,
    );
    registry.declare(
        "/protected/",
        &[Method::GET, Method::POST],
        "protected",
        protected::protected,
    );
}
