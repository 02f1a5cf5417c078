use crate::error::FileExportResult;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory that receives every per-device artifact
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory (and parents) if it is missing
    pub fn ensure_exists(&self) -> FileExportResult<()> {
        std::fs::create_dir_all(&self.root)?;
        info!(output_dir = %self.root.display(), "output directory ready");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `hielera_<device>_<suffix>` inside the directory
    pub fn device_file(&self, device_id: &str, suffix: &str) -> PathBuf {
        self.root
            .join(format!("hielera_{}_{}", sanitize_device_id(device_id), suffix))
    }
}

/// Keep ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
/// A rewritten id gets a short hash of the original appended so that ids
/// like `A/B` and `A_B` never share a file.
fn sanitize_device_id(device_id: &str) -> String {
    let sanitized: String = device_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        return "unknown".to_string();
    }
    if sanitized == device_id {
        return sanitized;
    }
    format!("{}-{}", sanitized, short_digest(device_id))
}

fn short_digest(device_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(device_id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_file_name() {
        let dir = OutputDir::new("/tmp/out");
        assert_eq!(
            dir.device_file("H-01", "report.txt"),
            PathBuf::from("/tmp/out/hielera_H-01_report.txt")
        );
    }

    #[test]
    fn test_device_id_is_sanitized() {
        let dir = OutputDir::new("out");

        let path = dir.device_file("../etc/passwd", "data.csv");
        let name = path.file_name().unwrap().to_str().unwrap();

        assert!(name.starts_with("hielera____etc_passwd-"));
        assert!(name.ends_with("_data.csv"));
        assert_eq!(path.parent().unwrap(), Path::new("out"));
        assert_eq!(
            dir.device_file("", "data.csv"),
            PathBuf::from("out/hielera_unknown_data.csv")
        );
    }

    #[test]
    fn test_sanitized_ids_do_not_collide() {
        // Arrange
        let dir = OutputDir::new("out");

        // Act
        let slash = dir.device_file("A/B", "report.txt");
        let underscore = dir.device_file("A_B", "report.txt");
        let space = dir.device_file("A B", "report.txt");

        // Assert
        assert_eq!(underscore, PathBuf::from("out/hielera_A_B_report.txt"));
        assert_ne!(slash, underscore);
        assert_ne!(space, underscore);
        assert_ne!(slash, space);
    }

    #[test]
    fn test_sanitized_name_is_stable() {
        let dir = OutputDir::new("out");
        assert_eq!(
            dir.device_file("A/B", "trend.svg"),
            dir.device_file("A/B", "trend.svg")
        );
    }

    #[test]
    fn test_ensure_exists_creates_nested_dirs() {
        let root = std::env::temp_dir()
            .join(format!("file_export_output_dir_{}", std::process::id()))
            .join("nested");
        let dir = OutputDir::new(&root);

        dir.ensure_exists().unwrap();
        assert!(root.is_dir());

        // idempotent
        dir.ensure_exists().unwrap();

        std::fs::remove_dir_all(root.parent().unwrap()).unwrap();
    }
}
