use ort::execution_providers::ExecutionProviderDispatch;

/// Hardware execution providers to try before ONNX Runtime's CPU default.
///
/// Registration is best-effort: a provider missing at runtime leaves the
/// session on CPU.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    let providers = platform_providers();
    log::debug!(
        "Requesting {} accelerated execution provider(s)",
        providers.len()
    );
    providers
}

#[cfg(target_os = "macos")]
fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
}

#[cfg(target_os = "windows")]
fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_providers() -> Vec<ExecutionProviderDispatch> {
    Vec::new()
}
