use crate::core::Storage;
use crate::utils::error::{ExportError, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Files under a base directory. Absolute paths ignore the base.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    type Writer = BufWriter<File>;

    fn create(&self, path: &str) -> Result<Self::Writer> {
        let full_path = self.resolve(path);
        let shown = full_path.display().to_string();

        if let Some(parent) = full_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ExportError::write_failure(&shown, e))?;
        }

        let file = File::create(&full_path).map_err(|e| ExportError::write_failure(&shown, e))?;
        tracing::debug!("Created output file {}", shown);
        Ok(BufWriter::new(file))
    }

    fn display_path(&self, path: &str) -> String {
        let full_path = self.resolve(path);
        match full_path.strip_prefix(Path::new(".")) {
            Ok(relative) => relative.display().to_string(),
            Err(_) => full_path.display().to_string(),
        }
    }
}
