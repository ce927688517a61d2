/// Errors from the physics thread lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("failed to spawn physics thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("physics thread panicked")]
    ThreadPanicked,
}
