//! Authentication module for API key verification.

mod extractor;

use secrecy::{ExposeSecret, SecretString};
use subtle::{Choice, ConstantTimeEq};

use crate::config::Config;

pub use extractor::{Authenticated, CredentialSource, extract_credential};

/// The set of valid API keys, loaded once at process start.
/// Uses `SecretString` to prevent accidental logging and zeroize on drop.
///
/// An empty set is a valid, if degenerate, state: the gate fails closed
/// with a configuration error rather than silently accepting everything.
///
/// # Security features
/// - `Debug` prints the key count instead of any key material
/// - Memory is zeroed when dropped (via `zeroize`)
/// - Membership checks are constant-time per entry and scan the whole set
#[derive(Clone)]
pub struct ApiKeySet {
    keys: Vec<SecretString>,
}

impl ApiKeySet {
    /// Build the set from the configured key strings.
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            keys: keys.into_iter().map(SecretString::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check whether `candidate` is one of the configured keys.
    ///
    /// Every key is compared with `subtle::ConstantTimeEq`; results are
    /// OR-combined so the loop never exits early on a match. `ct_eq` on
    /// slices returns false for unequal lengths without branching on the
    /// position of the first difference.
    pub fn contains(&self, candidate: &str) -> bool {
        let mut matched = Choice::from(0u8);
        for key in &self.keys {
            matched |= key.expose_secret().as_bytes().ct_eq(candidate.as_bytes());
        }
        matched.into()
    }
}

impl std::fmt::Debug for ApiKeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKeySet({} keys, [REDACTED])", self.keys.len())
    }
}

/// Ordered list of path prefixes that bypass authentication entirely.
///
/// A request path matches when it equals an entry exactly or starts with
/// the entry followed by a path separator, so `/health` covers `/health`
/// and `/health/` but not `/healthz`.
#[derive(Debug, Clone)]
pub struct ExemptPaths {
    prefixes: Vec<String>,
}

impl ExemptPaths {
    pub fn new(paths: impl IntoIterator<Item = String>) -> Self {
        let prefixes = paths
            .into_iter()
            .map(|p| {
                let p = p.trim_end_matches('/');
                if p.starts_with('/') {
                    p.to_string()
                } else {
                    format!("/{}", p)
                }
            })
            .collect();
        Self { prefixes }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

/// The principal attached to a request after successful authentication.
///
/// All valid keys map to this single fixed administrative identity;
/// authentication never distinguishes which key was used. Identity
/// resolution carries no account state and no side effects.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RequestIdentity {
    pub name: &'static str,
}

impl RequestIdentity {
    pub fn admin() -> Self {
        Self { name: "admin" }
    }
}

/// Everything the gate middleware needs to decide a request, resolved
/// once at startup and shared read-only across workers.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    pub keys: ApiKeySet,
    pub exempt: ExemptPaths,
    pub auth_disabled: bool,
}

impl GatePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            keys: ApiKeySet::new(config.api_keys.iter().cloned()),
            exempt: ExemptPaths::new(config.exempt_paths.iter().cloned()),
            auth_disabled: config.auth_disabled,
        }
    }
}
