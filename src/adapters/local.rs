use crate::domain::ports::ReferenceSource;
use crate::utils::error::{IntakeError, Result};
use std::path::{Path, PathBuf};

/// 從本機目錄讀取參照 JSON
#[derive(Debug, Clone)]
pub struct LocalReferenceSource {
    base_path: PathBuf,
}

impl LocalReferenceSource {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl ReferenceSource for LocalReferenceSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(name);
        tracing::debug!("Reading reference file {}", full_path.display());
        tokio::fs::read(&full_path)
            .await
            .map_err(|e| IntakeError::DataLoadError {
                resource: name.to_string(),
                message: format!("{}: {}", full_path.display(), e),
            })
    }

    fn describe(&self) -> String {
        self.base_path.display().to_string()
    }
}
