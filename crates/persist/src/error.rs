use std::path::PathBuf;

/// Errors from reading or writing persisted records.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no saved state at {}", .0.display())]
    NotFound(PathBuf),
    #[error("saved state at {} is {actual} bytes, expected {expected}", .path.display())]
    Truncated {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
    #[error("saved state at {} contains non-finite values", .0.display())]
    Corrupt(PathBuf),
}
