/// 内存语言文档存储
///
/// 不接触文件系统，适合测试或宿主自行管理数据的场景。
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use super::traits::LanguageStore;
use crate::utils::LocalizerError;

/// 内存存储（单线程）
#[derive(Debug, Default)]
pub struct MemoryLanguageStore {
    documents: RefCell<HashMap<String, Vec<u8>>>,
    /// 设置后所有写入都失败
    read_only: bool,
}

impl MemoryLanguageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入总是失败的存储
    pub fn read_only() -> Self {
        Self { read_only: true, ..Self::default() }
    }

    /// 预置一份文档
    pub fn insert(&self, language: &str, bytes: impl Into<Vec<u8>>) {
        self.documents.borrow_mut().insert(language.to_string(), bytes.into());
    }

    pub fn is_empty(&self) -> bool {
        self.documents.borrow().is_empty()
    }
}

impl LanguageStore for MemoryLanguageStore {
    fn read(&self, language: &str) -> Option<Vec<u8>> {
        self.documents.borrow().get(language).cloned()
    }

    fn write(&self, language: &str, bytes: &[u8]) -> Result<(), LocalizerError> {
        if self.read_only {
            return Err(LocalizerError::Store(format!("store is read-only, cannot write '{}'", language)));
        }
        self.insert(language, bytes);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|language| self.documents.borrow().contains_key(language))
    }

    fn document_path(&self, language: &str) -> PathBuf {
        PathBuf::from(format!("{}.json", language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryLanguageStore::new();
        assert!(store.is_empty());
        assert!(!store.has_document("default"));

        store.write("default", b"{}").unwrap();
        assert!(store.has_document("default"));
        assert_eq!(store.read("default"), Some(b"{}".to_vec()));
        assert!(!store.is_empty());
    }

    #[test]
    fn test_read_only_store() {
        let store = MemoryLanguageStore::read_only();
        assert!(matches!(store.write("default", b"{}"), Err(LocalizerError::Store(_))));
        assert!(store.read("default").is_none());
    }
}
