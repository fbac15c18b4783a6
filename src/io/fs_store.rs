/// 语言文档文件存储
///
/// 每种语言一个 JSON 文件：`<root>/<language>.json`
use std::path::{Path, PathBuf};
use super::traits::LanguageStore;
use crate::utils::{create_backup, LocalizerError};

/// 默认的语言文档存储（基于 std::fs）
#[derive(Debug, Clone)]
pub struct FsLanguageStore {
    root: PathBuf,
}

impl FsLanguageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LanguageStore for FsLanguageStore {
    fn read(&self, language: &str) -> Option<Vec<u8>> {
        let path = self.document_path(language);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write(&self, language: &str, bytes: &[u8]) -> Result<(), LocalizerError> {
        // 确保目录存在
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.document_path(language), bytes)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn document_path(&self, language: &str) -> PathBuf {
        self.root.join(format!("{}.json", language))
    }

    fn backup(&self, language: &str) -> Result<Option<PathBuf>, LocalizerError> {
        let path = self.document_path(language);
        if !path.exists() {
            return Ok(None);
        }
        create_backup(&path).map(Some)
    }
}
