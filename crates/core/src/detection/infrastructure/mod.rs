pub mod execution_provider;
pub mod onnx_part_detector;
pub mod replay_detector;
