//! Provider resolution.
//!
//! # Responsibilities
//! - Hold the ordered list of candidate message factories
//! - Pick the first candidate compiled into this build
//! - Memoize the choice for the rest of the process
//!
//! # Design Decisions
//! - Resolution is a pure scan over the list; caching is a separate step
//! - Unknown names stay in the list and simply never resolve
//! - The cache is written once under a mutex and read lock-free afterwards
//! - Failures are not cached: they are fatal to the caller anyway

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;

use crate::error::{Error, Result};
use crate::provider::MessageFactory;

static RESOLVED: ArcSwapOption<ResolvedFactory> = ArcSwapOption::const_empty();
static RESOLVE_LOCK: Mutex<()> = Mutex::new(());

/// Built-in provider names in default priority order.
pub const DEFAULT_PROVIDER_ORDER: [&str; 3] = ["http", "url", "reqwest"];

type Constructor = fn() -> Option<Arc<dyn MessageFactory>>;

/// A named factory implementation that may or may not be available.
#[derive(Clone)]
pub struct ProviderCandidate {
    name: String,
    construct: Constructor,
}

impl ProviderCandidate {
    /// Create a candidate from a name and a constructor.
    ///
    /// The constructor returns `None` when the implementation is not loadable.
    pub fn new(name: impl Into<String>, construct: Constructor) -> Self {
        Self {
            name: name.into(),
            construct,
        }
    }

    /// Look up a built-in candidate by name.
    ///
    /// Unknown names yield a candidate that is never loadable.
    pub fn named(name: &str) -> Self {
        let construct: Constructor = match name {
            "http" => http_factory,
            "url" => url_factory,
            "reqwest" => reqwest_factory,
            _ => unavailable,
        };
        Self::new(name, construct)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instantiate the factory, or `None` if it is not compiled in.
    pub fn instantiate(&self) -> Option<Arc<dyn MessageFactory>> {
        (self.construct)()
    }
}

impl fmt::Debug for ProviderCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCandidate")
            .field("name", &self.name)
            .finish()
    }
}

fn http_factory() -> Option<Arc<dyn MessageFactory>> {
    #[cfg(feature = "http-provider")]
    {
        Some(Arc::new(crate::provider::http_message::HttpMessageFactory))
    }
    #[cfg(not(feature = "http-provider"))]
    {
        None
    }
}

fn url_factory() -> Option<Arc<dyn MessageFactory>> {
    #[cfg(feature = "url-provider")]
    {
        Some(Arc::new(crate::provider::url_message::UrlMessageFactory))
    }
    #[cfg(not(feature = "url-provider"))]
    {
        None
    }
}

fn reqwest_factory() -> Option<Arc<dyn MessageFactory>> {
    #[cfg(feature = "reqwest-provider")]
    {
        Some(Arc::new(crate::provider::reqwest_message::ReqwestMessageFactory))
    }
    #[cfg(not(feature = "reqwest-provider"))]
    {
        None
    }
}

fn unavailable() -> Option<Arc<dyn MessageFactory>> {
    None
}

/// The factory chosen by [`ProviderResolver::resolve`].
#[derive(Clone)]
pub struct ResolvedFactory {
    factory: Arc<dyn MessageFactory>,
}

impl ResolvedFactory {
    pub fn name(&self) -> &'static str {
        self.factory.provider()
    }

    pub fn factory(&self) -> Arc<dyn MessageFactory> {
        Arc::clone(&self.factory)
    }
}

impl fmt::Debug for ResolvedFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedFactory")
            .field("provider", &self.name())
            .finish()
    }
}

/// Ordered list of provider candidates.
#[derive(Debug, Clone)]
pub struct ProviderResolver {
    candidates: Vec<ProviderCandidate>,
}

impl Default for ProviderResolver {
    fn default() -> Self {
        Self::from_names(DEFAULT_PROVIDER_ORDER)
    }
}

impl ProviderResolver {
    pub fn new(candidates: Vec<ProviderCandidate>) -> Self {
        Self { candidates }
    }

    /// Build a resolver from provider names, keeping their order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| ProviderCandidate::named(name.as_ref()))
                .collect(),
        )
    }

    pub fn candidates(&self) -> &[ProviderCandidate] {
        &self.candidates
    }

    /// Return the first loadable candidate, in priority order.
    pub fn resolve(&self) -> Result<ResolvedFactory> {
        for candidate in &self.candidates {
            match candidate.instantiate() {
                Some(factory) => {
                    tracing::info!(provider = candidate.name(), "HTTP message provider resolved");
                    return Ok(ResolvedFactory { factory });
                }
                None => {
                    tracing::debug!(provider = candidate.name(), "HTTP message provider not available");
                }
            }
        }

        tracing::error!(
            candidates = ?self.candidates.iter().map(ProviderCandidate::name).collect::<Vec<_>>(),
            "No HTTP message provider available"
        );
        Err(Error::NoProviderAvailable)
    }

    /// Resolve once per process and reuse the result.
    ///
    /// The first successful resolution wins; later calls return it even if
    /// they are made on a resolver with a different candidate list.
    pub fn resolve_cached(&self) -> Result<ResolvedFactory> {
        if let Some(resolved) = RESOLVED.load_full() {
            return Ok(ResolvedFactory::clone(&resolved));
        }

        let _guard = RESOLVE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resolved) = RESOLVED.load_full() {
            return Ok(ResolvedFactory::clone(&resolved));
        }

        let resolved = self.resolve()?;
        RESOLVED.store(Some(Arc::new(resolved.clone())));
        Ok(resolved)
    }
}

/// Forget the cached resolution so the next call resolves again.
#[cfg(test)]
pub(crate) fn reset_cache() {
    let _guard = RESOLVE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    RESOLVED.store(None);
}
