//! Helpers for working directly with ONNX Runtime sessions.

use crate::core::config::{OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig};
use crate::core::errors::OCRError;
use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use std::path::Path;

/// Loads a session, applying `config` when given.
///
/// ORT's own logging is capped at `Error` so it does not interleave with
/// `tracing` output.
pub fn build_session(
    model_path: impl AsRef<Path>,
    config: Option<&OrtSessionConfig>,
) -> Result<Session, OCRError> {
    let path = model_path.as_ref();
    let builder = Session::builder()?.with_log_level(LogLevel::Error)?;
    let builder = match config {
        Some(cfg) => apply_ort_config(builder, cfg)?,
        None => builder,
    };
    builder
        .commit_from_file(path)
        .map_err(|e| OCRError::model_load_error(path, "failed to create ONNX session", e))
}

fn apply_ort_config(
    mut builder: SessionBuilder,
    cfg: &OrtSessionConfig,
) -> Result<SessionBuilder, ort::Error> {
    if let Some(intra) = cfg.intra_threads {
        builder = builder.with_intra_threads(intra)?;
    }
    if let Some(inter) = cfg.inter_threads {
        builder = builder.with_inter_threads(inter)?;
    }
    if let Some(par) = cfg.parallel_execution {
        builder = builder.with_parallel_execution(par)?;
    }
    if let Some(level) = cfg.optimization_level {
        let mapped = match level {
            OrtGraphOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
            OrtGraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
            OrtGraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
            OrtGraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        };
        builder = builder.with_optimization_level(mapped)?;
    }
    if let Some(eps) = &cfg.execution_providers {
        let providers = build_execution_providers(eps);
        if !providers.is_empty() {
            builder = builder.with_execution_providers(providers)?;
        }
    }
    Ok(builder)
}

fn build_execution_providers(eps: &[OrtExecutionProvider]) -> Vec<ExecutionProviderDispatch> {
    let mut providers = Vec::new();
    for ep in eps {
        match ep {
            OrtExecutionProvider::CPU => {
                providers.push(ort::execution_providers::CPUExecutionProvider::default().build());
            }
            #[cfg(feature = "cuda")]
            OrtExecutionProvider::CUDA { device_id } => {
                let mut cuda = ort::execution_providers::CUDAExecutionProvider::default();
                if let Some(id) = device_id {
                    cuda = cuda.with_device_id(*id);
                }
                providers.push(cuda.build());
            }
            #[cfg(not(feature = "cuda"))]
            OrtExecutionProvider::CUDA { .. } => {
                tracing::warn!("CUDA execution provider requested but the `cuda` feature is off");
            }
        }
    }
    providers
}
