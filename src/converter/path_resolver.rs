//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output speculari (mirrored).
//! L'identità relativa di un file (sottodirectory + base name) deriva
//! solo dal path di input, mai dal contenuto.

use crate::error::ConvertError;
use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory (relative to the input root) and base name of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeIdentity {
    /// Directory part of the path relative to the input root, empty at depth 0
    pub subdir: PathBuf,
    /// File name with only its final extension removed (`a.b.png` -> `a.b`)
    pub base_name: OsString,
    /// Full path relative to the input root, used for log lines
    pub relative_path: PathBuf,
}

impl RelativeIdentity {
    /// `<output_dir>/<base_name>.<extension>`
    pub fn output_file(&self, output_dir: &Path, extension: &str) -> PathBuf {
        let mut file_name = self.base_name.clone();
        file_name.push(".");
        file_name.push(extension);
        output_dir.join(file_name)
    }
}

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Derives the relative identity of `file_path` under `input_root`
    pub fn relative_identity(input_root: &Path, file_path: &Path) -> Result<RelativeIdentity> {
        let relative_path = file_path.strip_prefix(input_root).map_err(|_| {
            ConvertError::InvalidPath(format!(
                "{} is not inside {}",
                file_path.display(),
                input_root.display()
            ))
        })?;

        let base_name = relative_path
            .file_stem()
            .ok_or_else(|| {
                ConvertError::InvalidPath(format!("no file name: {}", file_path.display()))
            })?
            .to_os_string();

        let subdir = relative_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(RelativeIdentity {
            subdir,
            base_name,
            relative_path: relative_path.to_path_buf(),
        })
    }

    /// Creates (if needed) and returns the output directory mirroring `file_path`
    pub async fn ensure_mirrored_dir(
        input_root: &Path,
        output_root: &Path,
        file_path: &Path,
    ) -> Result<PathBuf> {
        let identity = Self::relative_identity(input_root, file_path)?;
        let target = output_root.join(&identity.subdir);

        // create_dir_all already treats an existing directory as success
        tokio::fs::create_dir_all(&target)
            .await
            .map_err(|e| ConvertError::filesystem(&target, e))?;

        debug!("Mirrored dir: {} -> {}", file_path.display(), target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_base_name_strips_final_extension_only() {
        let identity =
            PathResolver::relative_identity(Path::new("/raw"), Path::new("/raw/a.b.png")).unwrap();
        assert_eq!(identity.base_name, "a.b");
        assert_eq!(identity.subdir, PathBuf::new());
        assert_eq!(identity.output_file(Path::new("/out"), "webp"), PathBuf::from("/out/a.b.webp"));
    }

    #[test]
    fn test_subdirectory_preserved() {
        let identity =
            PathResolver::relative_identity(Path::new("/raw"), Path::new("/raw/icons/sun.png"))
                .unwrap();
        assert_eq!(identity.subdir, PathBuf::from("icons"));
        assert_eq!(identity.base_name, "sun");
        assert_eq!(identity.relative_path, PathBuf::from("icons/sun.png"));
    }

    #[test]
    fn test_extensionless_and_dotfiles() {
        let identity =
            PathResolver::relative_identity(Path::new("/raw"), Path::new("/raw/README")).unwrap();
        assert_eq!(identity.base_name, "README");

        let identity =
            PathResolver::relative_identity(Path::new("/raw"), Path::new("/raw/.hidden")).unwrap();
        assert_eq!(identity.base_name, ".hidden");
    }

    #[test]
    fn test_file_outside_root_is_rejected() {
        let err = PathResolver::relative_identity(Path::new("/raw"), Path::new("/other/a.png"))
            .unwrap_err();
        let err = err.downcast_ref::<ConvertError>().unwrap();
        assert!(err.is_filesystem());
    }

    #[tokio::test]
    async fn test_ensure_mirrored_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let input_root = temp_dir.path().join("raw");
        let output_root = temp_dir.path().join("public");
        let file = input_root.join("x/y/z/deep.png");

        let first = PathResolver::ensure_mirrored_dir(&input_root, &output_root, &file)
            .await
            .unwrap();
        assert_eq!(first, output_root.join("x/y/z"));
        assert!(first.is_dir());

        let second = PathResolver::ensure_mirrored_dir(&input_root, &output_root, &file)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_ensure_mirrored_dir_at_root_depth() {
        let temp_dir = TempDir::new().unwrap();
        let input_root = temp_dir.path().join("raw");
        let output_root = temp_dir.path().join("public");

        let file = input_root.join("logo.png");
        let dir = PathResolver::ensure_mirrored_dir(&input_root, &output_root, &file)
            .await
            .unwrap();
        assert_eq!(dir, output_root);
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_mirrored_dir_fails_when_blocked_by_file() {
        let temp_dir = TempDir::new().unwrap();
        let input_root = temp_dir.path().join("raw");
        let output_root = temp_dir.path().join("public");
        std::fs::write(&output_root, b"not a directory").unwrap();

        let file = input_root.join("a/b.png");
        let err = PathResolver::ensure_mirrored_dir(&input_root, &output_root, &file)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConvertError>(),
            Some(ConvertError::Filesystem { .. })
        ));
    }
}
