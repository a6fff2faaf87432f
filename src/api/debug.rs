//! Debug endpoint: live route table plus a database connectivity probe.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::db::{DbStatus, ProbeHandle};
use crate::routes::RouteRegistry;

#[derive(Serialize)]
struct RouteView {
    pattern: String,
    methods: Vec<String>,
    name: String,
}

#[derive(Serialize)]
struct DebugResponse {
    message: &'static str,
    routes: Vec<RouteView>,
    database: DbStatus,
}

/// Debug endpoint. Exempt from authentication; reports the activated
/// route table and whether the database probe can reach Postgres.
pub async fn debug_info(
    registry: web::Data<RouteRegistry>,
    probe: web::Data<ProbeHandle>,
) -> HttpResponse {
    let routes = registry
        .list()
        .map(|info| RouteView {
            pattern: info.pattern.clone(),
            methods: info.methods.iter().map(|m| m.to_string()).collect(),
            name: info.name.clone(),
        })
        .collect();

    let database = probe.probe().await;

    HttpResponse::Ok().json(DebugResponse {
        message: "Debug route working!",
        routes,
        database,
    })
}
