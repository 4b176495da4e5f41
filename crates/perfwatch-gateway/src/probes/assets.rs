use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;

use perfwatch_core::error::{PerfWatchError, Result};
use perfwatch_core::probe::elapsed_ms;

/// Filesystem view of the static assets served by the host application.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Number of entries directly inside `dir`. A missing directory counts as empty.
    async fn count_entries(&self, dir: &Path) -> Result<usize>;

    async fn exists(&self, path: &Path) -> bool;
}

/// Time one directory listing: `(elapsed ms, entry count)`.
pub async fn timed_listing(store: &dyn AssetStore, dir: &Path) -> Result<(f64, usize)> {
    let start = Instant::now();
    let count = store.count_entries(dir).await?;
    Ok((elapsed_ms(start), count))
}

/// Local disk, with relative paths resolved against `root`.
#[derive(Debug, Clone)]
pub struct LocalAssets {
    root: PathBuf,
}

impl LocalAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl AssetStore for LocalAssets {
    async fn count_entries(&self, dir: &Path) -> Result<usize> {
        let dir = self.resolve(dir);
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(0);
        }

        let failed = |e: std::io::Error| {
            PerfWatchError::Unavailable(format!("list {} failed: {e}", dir.display()))
        };
        let mut rd = tokio::fs::read_dir(&dir).await.map_err(failed)?;

        let mut n = 0usize;
        while rd.next_entry().await.map_err(failed)?.is_some() {
            n += 1;
        }
        Ok(n)
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_entries_and_checks_paths() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("static/js")).unwrap();
        std::fs::write(tmp.path().join("static/app.css"), "body{}").unwrap();
        std::fs::write(tmp.path().join("static/js/critical-mobile.js"), "").unwrap();

        let store = LocalAssets::new(tmp.path());
        assert_eq!(store.count_entries(Path::new("static")).await.unwrap(), 2);
        assert!(store.exists(Path::new("static/js/critical-mobile.js")).await);
        assert!(!store.exists(Path::new("static/optimized")).await);
    }

    #[tokio::test]
    async fn missing_directory_counts_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = LocalAssets::new(tmp.path());

        let (ms, count) = timed_listing(&store, Path::new("static")).await.unwrap();
        assert_eq!(count, 0);
        assert!(ms >= 0.0);
    }

    #[tokio::test]
    async fn listing_a_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("static"), "not a dir").unwrap();

        let store = LocalAssets::new(tmp.path());
        let err = store.count_entries(Path::new("static")).await.unwrap_err();
        assert_eq!(err.client_code().as_str(), "UNAVAILABLE");
    }
}
