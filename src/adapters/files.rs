use crate::domain::model::UploadFile;
use crate::domain::ports::PhotoSource;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, IMAGE_EXTENSIONS};
use std::path::{Path, PathBuf};

/// 從本機資料夾讀取照片
#[derive(Debug, Clone)]
pub struct LocalPhotoSource {
    base_path: PathBuf,
}

impl LocalPhotoSource {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl PhotoSource for LocalPhotoSource {
    async fn load(&self, path: &str) -> Result<UploadFile> {
        validate_file_extensions("photos", &[path.to_string()], IMAGE_EXTENSIONS)?;

        let full_path = self.base_path.join(path);
        let data = tokio::fs::read(&full_path).await?;
        let name = full_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path)
            .to_string();

        tracing::debug!("Loaded {} ({} bytes)", name, data.len());
        Ok(UploadFile::new(name, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ReelError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_photo_from_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("living")).unwrap();
        std::fs::write(dir.path().join("living/sofa.jpg"), b"jpeg").unwrap();

        let source = LocalPhotoSource::new(dir.path());
        let file = source.load("living/sofa.jpg").await.unwrap();
        assert_eq!(file.name, "sofa.jpg");
        assert_eq!(file.content_type, "image/jpeg");
        assert_eq!(file.data, b"jpeg");
    }

    #[tokio::test]
    async fn test_load_rejects_non_images_and_missing_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        let source = LocalPhotoSource::new(dir.path());

        assert!(matches!(
            source.load("notes.txt").await,
            Err(ReelError::InvalidConfigValueError { .. })
        ));
        assert!(matches!(
            source.load("missing.png").await,
            Err(ReelError::IoError(_))
        ));
    }
}
