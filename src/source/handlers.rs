//! Built-in source handlers

use crate::native::{NativePlayer, NativeSource};
use crate::source::{MediaSource, SourceHandler};
use crate::utils::error::{IntoPlayerError, PlayerError, Result};
use async_trait::async_trait;
use log::debug;

/// Attaches `MediaSource::Uri` after validating it
pub struct UriSourceHandler;

#[async_trait]
impl SourceHandler for UriSourceHandler {
    async fn attach(&self, player: &dyn NativePlayer, source: &MediaSource) -> Result<()> {
        let MediaSource::Uri(uri) = source else {
            return Err(PlayerError::UnsupportedSource(source.to_string()));
        };

        let url = url::Url::parse(uri).source_err("Invalid uri")?;
        debug!("Attaching uri source: {}", url);
        player.set_source(NativeSource::Uri(url.into()))
    }
}

/// Attaches `MediaSource::File` once the file is known to exist
pub struct FileSourceHandler;

#[async_trait]
impl SourceHandler for FileSourceHandler {
    async fn attach(&self, player: &dyn NativePlayer, source: &MediaSource) -> Result<()> {
        let MediaSource::File(path) = source else {
            return Err(PlayerError::UnsupportedSource(source.to_string()));
        };

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| PlayerError::NotFound(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(PlayerError::Source(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        debug!("Attaching file source: {}", path.display());
        player.set_source(NativeSource::Path(path.clone()))
    }
}
