//! Trash (recycle bin) interaction.

use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Moves entries to the platform trash and restores them by original path.
pub trait Trash: Send + Sync {
    /// Moves the file or directory at `path` to the trash.
    fn trash(&self, path: &Path) -> CoreResult<()>;

    /// Restores the most recently trashed item whose original location was
    /// `original_path`.
    fn restore(&self, original_path: &Path) -> CoreResult<()>;
}

/// [`Trash`] backed by the desktop trash via the `trash` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

impl SystemTrash {
    pub fn new() -> Self {
        Self
    }
}

impl Trash for SystemTrash {
    fn trash(&self, path: &Path) -> CoreResult<()> {
        if std::fs::symlink_metadata(path).is_err() {
            return Err(CoreError::NotFound(path.to_path_buf()));
        }
        trash::delete(path)?;
        Ok(())
    }

    #[cfg(any(
        windows,
        all(unix, not(target_os = "macos"), not(target_os = "ios"), not(target_os = "android"))
    ))]
    fn restore(&self, original_path: &Path) -> CoreResult<()> {
        if std::fs::symlink_metadata(original_path).is_ok() {
            return Err(CoreError::AlreadyExists(original_path.to_path_buf()));
        }

        let newest = trash::os_limited::list()?
            .into_iter()
            .filter(|item| item.original_path() == original_path)
            .max_by_key(|item| item.time_deleted);

        match newest {
            Some(item) => {
                trash::os_limited::restore_all([item])?;
                Ok(())
            }
            None => Err(CoreError::Trash(format!(
                "no trashed item for {}",
                original_path.display()
            ))),
        }
    }

    #[cfg(not(any(
        windows,
        all(unix, not(target_os = "macos"), not(target_os = "ios"), not(target_os = "android"))
    )))]
    fn restore(&self, original_path: &Path) -> CoreResult<()> {
        Err(CoreError::Trash(format!(
            "restoring from the trash is not supported on this platform: {}",
            original_path.display()
        )))
    }
}
