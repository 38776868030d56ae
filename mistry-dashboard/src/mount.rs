//! Mount targets
//!
//! A mount target receives every freshly rendered fragment. The poller never
//! knows where its output ends up: in memory for the HTTP server, in a file
//! on disk, or on standard output.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::{DashboardError, Result};
use crate::render::Renderer;

/// Destination for rendered job tables
#[async_trait]
pub trait MountTarget: Send + Sync {
    /// Replaces whatever is currently mounted with `fragment`
    async fn mount(&self, fragment: &str) -> Result<()>;
}

#[derive(Debug, Default)]
struct Mounted {
    fragment: String,
    renders: u64,
}

/// Keeps the latest fragment in memory
///
/// Clones share the same slot, so one clone can be handed to the poller and
/// another to the HTTP server.
#[derive(Debug, Clone, Default)]
pub struct MemoryMount {
    inner: Arc<RwLock<Mounted>>,
}

impl MemoryMount {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently mounted fragment (empty before the first render)
    pub async fn latest(&self) -> String {
        self.inner.read().await.fragment.clone()
    }

    /// How many times a fragment has been mounted
    pub async fn renders(&self) -> u64 {
        self.inner.read().await.renders
    }
}

#[async_trait]
impl MountTarget for MemoryMount {
    async fn mount(&self, fragment: &str) -> Result<()> {
        let mut mounted = self.inner.write().await;
        mounted.fragment = fragment.to_string();
        mounted.renders += 1;
        Ok(())
    }
}

/// Writes a complete HTML page to a file
///
/// The page is written to a `.tmp` sibling first and then renamed over the
/// target, so readers never observe a half-written page.
#[derive(Debug, Clone)]
pub struct FileMount {
    path: PathBuf,
    renderer: Renderer,
    refresh: Option<Duration>,
}

impl FileMount {
    pub fn new(path: impl Into<PathBuf>, renderer: Renderer, refresh: Option<Duration>) -> Self {
        Self {
            path: path.into(),
            renderer,
            refresh,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl MountTarget for FileMount {
    async fn mount(&self, fragment: &str) -> Result<()> {
        let page = self.renderer.render_page(fragment, self.refresh);
        let tmp = self.temp_path();

        tokio::fs::write(&tmp, page)
            .await
            .map_err(|source| DashboardError::Mount {
                path: tmp.clone(),
                source,
            })?;

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| DashboardError::Mount {
                path: self.path.clone(),
                source,
            })
    }
}

/// Prints every fragment to standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutMount;

#[async_trait]
impl MountTarget for StdoutMount {
    async fn mount(&self, fragment: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(fragment.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}
