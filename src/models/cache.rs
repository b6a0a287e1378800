//! Local cache of downloaded model artifacts.
//!
//! An artifact is identified only by its file name inside the cache directory:
//! present means usable. Downloads land in a temporary file next to the target
//! and are renamed into place only after the transfer completes, so an
//! interrupted download never leaves a file at the canonical path.

use super::fetch::{ArtifactFetcher, HttpFetcher};
use crate::core::constants::{
    CHARSET_FILE_NAME, DEFAULT_CACHE_SUBDIR, DEFAULT_REMOTE_BASE, MODEL_FILE_NAME,
};
use crate::core::errors::{OCRError, OcrResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// One lock per canonical path, shared by every cache in the process.
static DOWNLOAD_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = DOWNLOAD_LOCKS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    locks.entry(path.to_path_buf()).or_default().clone()
}

/// A remote file and the name it is cached under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteArtifact {
    /// Where to download from.
    pub url: String,
    /// File name inside the cache directory.
    pub file_name: String,
}

impl RemoteArtifact {
    pub fn new(url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_name: file_name.into(),
        }
    }

    /// The published recognition model.
    pub fn default_model() -> Self {
        Self::new(
            format!("{DEFAULT_REMOTE_BASE}/{MODEL_FILE_NAME}"),
            MODEL_FILE_NAME,
        )
    }

    /// The charset the published model was trained with.
    pub fn default_charset() -> Self {
        Self::new(
            format!("{DEFAULT_REMOTE_BASE}/{CHARSET_FILE_NAME}"),
            CHARSET_FILE_NAME,
        )
    }
}

/// Resolves artifacts to local paths, downloading each at most once.
#[derive(Clone)]
pub struct ModelCache {
    cache_dir: PathBuf,
    fetcher: Arc<dyn ArtifactFetcher>,
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl ModelCache {
    /// Creates a cache rooted at `cache_dir` that downloads over HTTP.
    pub fn new(cache_dir: impl Into<PathBuf>) -> OcrResult<Self> {
        Ok(Self::with_fetcher(cache_dir, Arc::new(HttpFetcher::new()?)))
    }

    /// Creates a cache with a custom transport.
    pub fn with_fetcher(cache_dir: impl Into<PathBuf>, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            fetcher,
        }
    }

    /// `$HOME/.monocr/models`, or `None` when no home directory is known.
    pub fn default_cache_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_CACHE_SUBDIR))
    }

    /// Creates a cache in [`default_cache_dir`](Self::default_cache_dir).
    pub fn with_default_dir() -> OcrResult<Self> {
        let dir = Self::default_cache_dir().ok_or_else(|| {
            OCRError::config_error("no home directory; set an explicit cache directory")
        })?;
        Self::new(dir)
    }

    /// Directory artifacts are stored in.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Canonical path of `artifact` in this cache.
    pub fn path_for(&self, artifact: &RemoteArtifact) -> PathBuf {
        self.cache_dir.join(&artifact.file_name)
    }

    /// Whether `artifact` is already present.
    pub fn is_cached(&self, artifact: &RemoteArtifact) -> bool {
        self.path_for(artifact).is_file()
    }

    /// Returns the local path of `artifact`, downloading it into the cache
    /// directory first if needed.
    pub fn ensure(&self, artifact: &RemoteArtifact) -> OcrResult<PathBuf> {
        self.ensure_in(&self.cache_dir, artifact)
    }

    /// Returns the path of `artifact` inside `dir`, downloading it if absent.
    ///
    /// An existing file is returned without any network access. Otherwise the
    /// directory is created, concurrent callers for the same path are
    /// serialized, and the body is streamed into a temporary file in `dir`
    /// that is renamed onto the canonical path once complete.
    ///
    /// # Errors
    ///
    /// `OCRError::Download` for network, HTTP status, or filesystem failures.
    /// The canonical path is left untouched in every failure case.
    pub fn ensure_in(&self, dir: &Path, artifact: &RemoteArtifact) -> OcrResult<PathBuf> {
        let target = dir.join(&artifact.file_name);
        if target.is_file() {
            debug!(path = %target.display(), "artifact already cached");
            return Ok(target);
        }

        std::fs::create_dir_all(dir).map_err(|e| {
            OCRError::download_failed(
                &artifact.url,
                format!("creating cache directory '{}'", dir.display()),
                e,
            )
        })?;

        let lock = path_lock(&target);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // Another caller may have finished while this one waited.
        if target.is_file() {
            return Ok(target);
        }

        info!(url = %artifact.url, path = %target.display(), "downloading artifact");
        self.download_to(&artifact.url, dir, &target)?;
        info!(path = %target.display(), "artifact cached");
        Ok(target)
    }

    fn download_to(&self, url: &str, dir: &Path, target: &Path) -> OcrResult<()> {
        let fs_error =
            |context: &str, e: std::io::Error| OCRError::download_failed(url, context.to_string(), e);

        let mut partial = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(dir)
            .map_err(|e| fs_error("creating temporary file", e))?;

        let bytes = self.fetcher.fetch(url, partial.as_file_mut())?;

        partial
            .as_file_mut()
            .flush()
            .and_then(|_| partial.as_file().sync_all())
            .map_err(|e| fs_error("flushing temporary file", e))?;

        partial
            .persist(target)
            .map_err(|e| fs_error("publishing downloaded file", e.error))?;

        debug!(url, bytes, "download complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
        body: &'static [u8],
    }

    impl CountingFetcher {
        fn new(body: &'static [u8]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                body,
            }
        }
    }

    impl ArtifactFetcher for CountingFetcher {
        fn fetch(&self, _url: &str, sink: &mut dyn Write) -> OcrResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            sink.write_all(self.body)?;
            Ok(self.body.len() as u64)
        }
    }

    /// Writes half a body, then fails like a dropped connection.
    struct FailingFetcher;

    impl ArtifactFetcher for FailingFetcher {
        fn fetch(&self, url: &str, sink: &mut dyn Write) -> OcrResult<u64> {
            sink.write_all(b"partial")?;
            Err(OCRError::download_error(url, "connection reset"))
        }
    }

    fn artifact() -> RemoteArtifact {
        RemoteArtifact::new("https://example.invalid/model.onnx", "model.onnx")
    }

    #[test]
    fn test_second_ensure_does_not_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher::new(b"weights"));
        let cache = ModelCache::with_fetcher(dir.path(), fetcher.clone());

        let first = cache.ensure(&artifact()).unwrap();
        let second = cache.ensure(&artifact()).unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read(&first).unwrap(), b"weights");
    }

    #[test]
    fn test_existing_file_is_returned_without_fetch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"local").unwrap();
        let fetcher = Arc::new(CountingFetcher::new(b"remote"));
        let cache = ModelCache::with_fetcher(dir.path(), fetcher.clone());

        let path = cache.ensure(&artifact()).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"local");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_download_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::with_fetcher(dir.path(), Arc::new(FailingFetcher));

        let err = cache.ensure(&artifact()).unwrap_err();
        assert!(err.is_retryable());
        assert!(!cache.is_cached(&artifact()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        let cache = ModelCache::with_fetcher(
            root.path(),
            Arc::new(CountingFetcher::new(b"weights")),
        );

        let path = cache.ensure_in(&nested, &artifact()).unwrap();
        assert_eq!(path, nested.join("model.onnx"));
        assert!(path.is_file());
    }

    #[test]
    fn test_concurrent_first_use_downloads_once() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher::new(b"weights"));
        let cache = ModelCache::with_fetcher(dir.path(), fetcher.clone());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.ensure(&artifact()).unwrap())
            })
            .collect();
        let paths: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(paths.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_artifacts() {
        let model = RemoteArtifact::default_model();
        assert!(model.url.ends_with("/monocr.onnx"));
        assert_eq!(model.file_name, "monocr.onnx");
        assert_eq!(RemoteArtifact::default_charset().file_name, "charset.txt");
    }
}
