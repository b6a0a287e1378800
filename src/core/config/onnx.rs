//! ONNX Runtime configuration types and utilities.

use super::errors::{ConfigError, ConfigValidator};
use serde::{Deserialize, Serialize};

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

/// Execution providers for ONNX Runtime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum OrtExecutionProvider {
    /// CPU execution provider (always available)
    #[default]
    CPU,
    /// NVIDIA CUDA execution provider, only honoured with the `cuda` feature.
    CUDA {
        /// CUDA device ID (default: 0)
        device_id: Option<i32>,
    },
}

/// Configuration for ONNX Runtime sessions.
///
/// Every field is optional; unset fields keep ONNX Runtime's own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes
    pub inter_threads: Option<usize>,
    /// Enable parallel execution mode
    pub parallel_execution: Option<bool>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Execution providers in order of preference
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    ///
    /// # Arguments
    ///
    /// * `threads` - Number of threads for intra-op parallelism.
    ///
    /// # Returns
    ///
    /// Self for method chaining.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallel_execution(mut self, enabled: bool) -> Self {
        self.parallel_execution = Some(enabled);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Adds a single execution provider.
    pub fn add_execution_provider(mut self, provider: OrtExecutionProvider) -> Self {
        self.execution_providers
            .get_or_insert_with(Vec::new)
            .push(provider);
        self
    }

    /// Returns the execution providers, defaulting to CPU.
    pub fn get_execution_providers(&self) -> Vec<OrtExecutionProvider> {
        self.execution_providers
            .clone()
            .unwrap_or_else(|| vec![OrtExecutionProvider::CPU])
    }
}

impl ConfigValidator for OrtSessionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threads) = self.intra_threads {
            self.validate_thread_count(threads)?;
        }
        if let Some(threads) = self.inter_threads {
            self.validate_thread_count(threads)?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ort_session_config_builder() {
        let config = OrtSessionConfig::new()
            .with_intra_threads(4)
            .with_inter_threads(2)
            .with_parallel_execution(true)
            .with_optimization_level(OrtGraphOptimizationLevel::Level3)
            .add_execution_provider(OrtExecutionProvider::CPU);

        assert_eq!(config.intra_threads, Some(4));
        assert_eq!(config.inter_threads, Some(2));
        assert_eq!(config.parallel_execution, Some(true));
        assert_eq!(
            config.optimization_level,
            Some(OrtGraphOptimizationLevel::Level3)
        );
        assert_eq!(
            config.get_execution_providers(),
            vec![OrtExecutionProvider::CPU]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_execution_provider_defaults() {
        let config = OrtSessionConfig::new();
        assert_eq!(
            config.get_execution_providers(),
            vec![OrtExecutionProvider::CPU]
        );
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = OrtSessionConfig::new().with_intra_threads(0);
        assert!(config.validate().is_err());
    }
}
