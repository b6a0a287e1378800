//! Transport for remote model artifacts.

use crate::core::errors::{OCRError, OcrResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

const PROGRESS_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] [{wide_bar}] {bytes}/{total_bytes} {bytes_per_sec} ({eta})";
const PROGRESS_LABEL_MAX: usize = 30;
const CHUNK_SIZE: usize = 64 * 1024;

/// Something that can stream the bytes behind a URL into a sink.
///
/// [`ModelCache`](super::ModelCache) only needs this one operation, so tests
/// and offline deployments can swap the network out entirely.
pub trait ArtifactFetcher: Send + Sync {
    /// Writes the full body of `url` to `sink` and returns the byte count.
    ///
    /// # Errors
    ///
    /// Any failure must be reported as `OCRError::Download`; partial output
    /// may already have been written to `sink`.
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> OcrResult<u64>;
}

/// Blocking HTTP(S) fetcher. Redirects are followed.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    show_progress: bool,
}

impl HttpFetcher {
    /// Creates a fetcher with a connect timeout and no overall deadline.
    pub fn new() -> OcrResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(None)
            .build()
            .map_err(|e| OCRError::download_failed("", "failed to build HTTP client", e))?;
        Ok(Self {
            client,
            show_progress: true,
        })
    }

    /// Enables or disables the terminal progress bar.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn progress_bar(&self, total: Option<u64>, url: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = match total {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        let label = url.rsplit('/').next().unwrap_or(url);
        let message = if label.chars().count() > PROGRESS_LABEL_MAX {
            let tail: String = label
                .chars()
                .rev()
                .take(PROGRESS_LABEL_MAX)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("..{tail}")
        } else {
            label.to_string()
        };
        bar.set_message(message);
        bar
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> OcrResult<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| OCRError::download_failed(url, "request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OCRError::download_error(
                url,
                format!("unexpected HTTP status {status}"),
            ));
        }

        let total = response.content_length();
        debug!(url, final_url = %response.url(), ?total, "downloading artifact");
        let bar = self.progress_bar(total, url);

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let n = response
                .read(&mut buf)
                .map_err(|e| OCRError::download_failed(url, "reading response body", e))?;
            if n == 0 {
                break;
            }
            sink.write_all(&buf[..n])
                .map_err(|e| OCRError::download_failed(url, "writing to cache", e))?;
            written += n as u64;
            bar.inc(n as u64);
        }
        bar.finish_and_clear();

        if let Some(total) = total
            && written != total
        {
            return Err(OCRError::download_error(
                url,
                format!("truncated body: expected {total} bytes, got {written}"),
            ));
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModelCache, RemoteArtifact};
    use std::net::TcpListener;
    use std::sync::Arc;

    fn response(status: &str, headers: &str, body: &[u8]) -> Vec<u8> {
        let mut out =
            format!("HTTP/1.1 {status}\r\n{headers}Connection: close\r\n\r\n").into_bytes();
        out.extend_from_slice(body);
        out
    }

    /// Serves canned responses on a loopback port and returns its base URL.
    fn serve() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut head = Vec::new();
                let mut byte = [0u8; 1];
                while !head.ends_with(b"\r\n\r\n") {
                    match stream.read(&mut byte) {
                        Ok(1) => head.push(byte[0]),
                        _ => break,
                    }
                }
                let head = String::from_utf8_lossy(&head);
                let reply = match head.split_whitespace().nth(1).unwrap_or("/") {
                    "/moved" => response(
                        "302 Found",
                        "Location: /model\r\nContent-Length: 0\r\n",
                        b"",
                    ),
                    "/model" => response("200 OK", "Content-Length: 7\r\n", b"weights"),
                    "/short" => response("200 OK", "Content-Length: 100\r\n", b"partial"),
                    _ => response("404 Not Found", "Content-Length: 4\r\n", b"nope"),
                };
                let _ = stream.write_all(&reply);
            }
        });
        base
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new().unwrap().with_progress(false)
    }

    #[test]
    fn test_not_found_is_a_download_error() {
        let base = serve();
        let mut sink = Vec::new();
        let err = fetcher()
            .fetch(&format!("{base}/missing"), &mut sink)
            .unwrap_err();
        assert!(matches!(err, OCRError::Download { .. }));
        assert!(err.to_string().contains("404"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_redirect_is_followed() {
        let base = serve();
        let mut sink = Vec::new();
        let written = fetcher().fetch(&format!("{base}/moved"), &mut sink).unwrap();
        assert_eq!(written, 7);
        assert_eq!(sink, b"weights");
    }

    #[test]
    fn test_truncated_body_is_rejected() {
        let base = serve();
        let mut sink = Vec::new();
        let err = fetcher()
            .fetch(&format!("{base}/short"), &mut sink)
            .unwrap_err();
        assert!(matches!(err, OCRError::Download { .. }));
    }

    #[test]
    fn test_failed_http_download_leaves_cache_empty() {
        let base = serve();
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::with_fetcher(dir.path(), Arc::new(fetcher()));
        let artifact = RemoteArtifact::new(format!("{base}/missing"), "monocr.onnx");

        let err = cache.ensure(&artifact).unwrap_err();
        assert!(matches!(err, OCRError::Download { .. }));
        assert!(!dir.path().join("monocr.onnx").exists());
        assert!(!cache.is_cached(&artifact));

        let ok = RemoteArtifact::new(format!("{base}/moved"), "monocr.onnx");
        let path = cache.ensure(&ok).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"weights");
    }
}
