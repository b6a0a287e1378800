use super::*;
use crate::core::config::OrtSessionConfig;
use crate::core::constants::{DEFAULT_INPUT_NAME, DEFAULT_SESSION_POOL_SIZE};
use crate::core::inference::session::build_session;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

impl OrtInfer {
    /// Creates a new OrtInfer instance with default ONNX Runtime settings and a single session.
    pub fn new(model_path: impl AsRef<Path>, input_name: Option<&str>) -> Result<Self, OCRError> {
        Self::from_config(
            model_path,
            input_name,
            None,
            DEFAULT_SESSION_POOL_SIZE,
            None,
        )
    }

    /// Creates a new OrtInfer instance, applying ORT session configuration and
    /// constructing a session pool for concurrent predictions.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the `.onnx` model.
    /// * `input_name` - Input tensor name; when `None` the session's first input is used.
    /// * `output_name` - Output tensor name; when `None` the session's first output is used.
    /// * `pool_size` - Number of sessions to create, at least one.
    /// * `ort_session` - Optional ORT session settings applied to every session.
    pub fn from_config(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
        output_name: Option<&str>,
        pool_size: usize,
        ort_session: Option<&OrtSessionConfig>,
    ) -> Result<Self, OCRError> {
        let path = model_path.as_ref();
        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            sessions.push(build_session(path, ort_session)?);
        }

        let input_name = match input_name {
            Some(name) => name.to_string(),
            None => sessions
                .first()
                .and_then(|session| session.inputs.first())
                .map(|input| input.name.clone())
                .unwrap_or_else(|| DEFAULT_INPUT_NAME.to_string()),
        };

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        debug!(
            model = %model_name,
            pool_size,
            input = %input_name,
            path = %path.display(),
            "created ONNX Runtime sessions"
        );

        Ok(OrtInfer {
            sessions: sessions.into_iter().map(Mutex::new).collect(),
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            output_name: output_name.map(|s| s.to_string()),
            model_path: path.to_path_buf(),
            model_name,
        })
    }
}
