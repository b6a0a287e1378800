use super::*;
use crate::core::config::OrtSessionConfig;

#[test]
fn test_missing_model_fails_to_load() {
    let result = OrtInfer::new("dummy_path.onnx", None);
    assert!(result.is_err());
}

#[test]
fn test_from_config_respects_session_pool_size() {
    let cfg = OrtSessionConfig::new().with_intra_threads(1);
    let result = OrtInfer::from_config("dummy_path.onnx", Some("input"), None, 3, Some(&cfg));
    assert!(result.is_err());
}
