use crate::error::PersistError;
use quarry_common::CameraState;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where the desktop app keeps the camera between sessions.
pub const DEFAULT_CAMERA_PATH: &str = "saves/cameraState.bin";

/// File holding one raw [`CameraState`] record.
#[derive(Debug, Clone)]
pub struct CameraStore {
    path: PathBuf,
}

impl Default for CameraStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAMERA_PATH)
    }
}

impl CameraStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. Trailing bytes beyond one record are ignored.
    pub fn load(&self) -> Result<CameraState, PersistError> {
        let bytes = std::fs::read(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => PersistError::NotFound(self.path.clone()),
            _ => PersistError::Io {
                path: self.path.clone(),
                source,
            },
        })?;

        if bytes.len() < CameraState::SIZE {
            return Err(PersistError::Truncated {
                path: self.path.clone(),
                expected: CameraState::SIZE,
                actual: bytes.len(),
            });
        }

        let state: CameraState = bytemuck::pod_read_unaligned(&bytes[..CameraState::SIZE]);
        let finite = state.position.iter().all(|v| v.is_finite())
            && [state.yaw, state.pitch, state.fov, state.near, state.far]
                .iter()
                .all(|v| v.is_finite());
        if !finite {
            return Err(PersistError::Corrupt(self.path.clone()));
        }
        Ok(state)
    }

    /// Write the record, creating parent directories as needed.
    pub fn save(&self, state: &CameraState) -> Result<(), PersistError> {
        let io_err = |source| PersistError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytemuck::bytes_of(state)).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        tracing::info!("camera state saved to {}", self.path.display());
        Ok(())
    }

    /// Load the record if possible, logging why not otherwise.
    pub fn restore(&self) -> Option<CameraState> {
        match self.load() {
            Ok(state) => {
                tracing::info!("camera state restored from {}", self.path.display());
                Some(state)
            }
            Err(PersistError::NotFound(_)) => {
                tracing::debug!("no camera state at {}", self.path.display());
                None
            }
            Err(e) => {
                tracing::warn!("ignoring camera state: {e}");
                None
            }
        }
    }
}
