//! Media source descriptors and their attach strategies
//!
//! A `MediaSource` is resolved once, when it is set on the player, to the
//! `SourceHandler` registered for its variant. The handler later attaches the
//! source to the native engine during prepare.

mod handlers;

pub use handlers::{FileSourceHandler, UriSourceHandler};

use crate::native::NativePlayer;
use crate::utils::error::{PlayerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Abstract media source supplied by the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Network or platform URI
    Uri(String),

    /// Local file
    File(PathBuf),
}

impl MediaSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            MediaSource::Uri(_) => SourceKind::Uri,
            MediaSource::File(_) => SourceKind::File,
        }
    }

    /// Build a descriptor from a command-line style argument
    ///
    /// Anything with a URI scheme is a `Uri`, everything else a `File`.
    pub fn parse(input: &str) -> Self {
        match url::Url::parse(input) {
            Ok(url) if url.scheme().len() > 1 => MediaSource::Uri(input.to_string()),
            _ => MediaSource::File(PathBuf::from(input)),
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Uri(uri) => write!(f, "{}", uri),
            MediaSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Variant tag used as registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Uri,
    File,
}

/// Strategy that binds one kind of media source to the native engine
#[async_trait]
pub trait SourceHandler: Send + Sync {
    /// Attach `source` to `player`; called while the engine is Idle
    async fn attach(&self, player: &dyn NativePlayer, source: &MediaSource) -> Result<()>;
}

/// Registry mapping source variants to attach strategies
#[derive(Clone)]
pub struct SourceRegistry {
    handlers: HashMap<SourceKind, Arc<dyn SourceHandler>>,
}

impl SourceRegistry {
    /// Registry without any handler
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with the built-in `Uri` and `File` handlers
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(SourceKind::Uri, Arc::new(UriSourceHandler));
        registry.register(SourceKind::File, Arc::new(FileSourceHandler));
        registry
    }

    /// Register or replace the handler for `kind`
    pub fn register(&mut self, kind: SourceKind, handler: Arc<dyn SourceHandler>) {
        self.handlers.insert(kind, handler);
    }

    /// Pair `source` with its handler
    pub fn resolve(&self, source: MediaSource) -> Result<ResolvedSource> {
        let handler = self
            .handlers
            .get(&source.kind())
            .cloned()
            .ok_or_else(|| PlayerError::UnsupportedSource(format!("{:?}", source.kind())))?;

        Ok(ResolvedSource { source, handler })
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// A media source together with the handler that attaches it
#[derive(Clone)]
pub struct ResolvedSource {
    source: MediaSource,
    handler: Arc<dyn SourceHandler>,
}

impl ResolvedSource {
    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub async fn attach(&self, player: &dyn NativePlayer) -> Result<()> {
        self.handler.attach(player, &self.source).await
    }
}

impl fmt::Debug for ResolvedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSource")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
