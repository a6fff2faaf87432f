//! Route registry: declare handlers up front, activate once, then hand
//! the materialized table to actix.
//!
//! The registry is an explicit object built once at startup and threaded
//! through to wherever routes are declared - there is no global singleton.
//! Declarations are stored as pending entries in insertion order;
//! `activate` moves them into the live table exactly once, and
//! `configure` applies the live table to actix's `ServiceConfig`. All of
//! this happens before the server binds, so requests never observe a
//! partially-activated table.

use actix_web::http::Method;
use actix_web::{FromRequest, Handler, Responder, web};
use tracing::{debug, warn};

/// Metadata for a declared route.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub pattern: String,
    pub methods: Vec<Method>,
    pub name: String,
}

struct RouteEntry {
    info: RouteInfo,
    register: Box<dyn Fn(&mut web::ServiceConfig) + Send + Sync>,
}

/// Registry of pending and active routes.
#[derive(Default)]
pub struct RouteRegistry {
    pending: Vec<RouteEntry>,
    active: Vec<RouteEntry>,
    activated: bool,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a handler for `pattern`, restricted to `methods`.
    ///
    /// Declarations can happen in any order and do not require the live
    /// table to exist yet. Insertion order is preserved; when two
    /// declarations share a pattern the first one registered wins at
    /// dispatch time.
    ///
    /// Handlers are plain async functions; the registration closure built
    /// here is the explicit bridge between that calling convention and
    /// actix's dispatch machinery.
    pub fn declare<F, Args>(&mut self, pattern: &str, methods: &[Method], name: &str, handler: F)
    where
        F: Handler<Args> + Send + Sync,
        Args: FromRequest + 'static,
        F::Output: Responder + 'static,
    {
        let info = RouteInfo {
            pattern: pattern.to_string(),
            methods: methods.to_vec(),
            name: name.to_string(),
        };

        let pattern = pattern.to_string();
        let methods = methods.to_vec();
        let name = name.to_string();
        let register = Box::new(move |cfg: &mut web::ServiceConfig| {
            let mut resource = web::resource(pattern.as_str()).name(&name);
            for method in &methods {
                resource = resource.route(web::method(method.clone()).to(handler.clone()));
            }
            cfg.service(resource);
        });

        debug!(pattern = %info.pattern, name = %info.name, "route declared");
        self.pending.push(RouteEntry { info, register });
    }

    /// Materialize all pending declarations into the live table.
    ///
    /// Idempotent: the first call moves every pending entry; later calls
    /// are no-ops and never re-register anything.
    pub fn activate(&mut self) {
        if self.activated {
            warn!("route registry already activated; ignoring repeated activation");
            return;
        }
        self.activated = true;
        debug!("activating {} pending routes", self.pending.len());
        self.active.append(&mut self.pending);
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// The live route table. Empty until `activate` has run.
    pub fn list(&self) -> impl Iterator<Item = &RouteInfo> {
        self.active.iter().map(|entry| &entry.info)
    }

    /// Apply every active route to an actix service configuration.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        for entry in &self.active {
            (entry.register)(cfg);
        }
    }
}
