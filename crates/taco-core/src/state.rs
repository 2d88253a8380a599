//! Application-level context object handed to the provider

use std::sync::Arc;

use crate::spec::TacoSpec;

/// A [`TacoSpec`] plus the backend it is served from.
///
/// Constructed once at startup and passed by reference to the provider.
/// Nothing is global, so independent instances can coexist (tests mount
/// several side by side).
#[derive(Debug, Clone)]
pub struct TacoState {
    spec: Arc<TacoSpec>,
    base_url: String,
}

impl TacoState {
    /// Create a new state. A trailing `/` on the base URL is dropped since
    /// routes start with one.
    pub fn new(spec: TacoSpec, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            spec: Arc::new(spec),
            base_url,
        }
    }

    pub fn spec(&self) -> &Arc<TacoSpec> {
        &self.spec
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Create the application state for a spec served at `url`
pub fn create_taco_bi(spec: TacoSpec, url: impl Into<String>) -> TacoState {
    TacoState::new(spec, url)
}
