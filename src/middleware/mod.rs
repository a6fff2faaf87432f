//! HTTP middleware: the API key gate and request logging.

mod api_key;
mod request_logger;

pub use api_key::ApiKeyGate;
pub use request_logger::RequestLogger;
