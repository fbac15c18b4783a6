/// IO 抽象层 - trait 定义
///
/// 该模块定义了语言文档存储的抽象接口，支持依赖注入和测试 mock。

use std::path::{Path, PathBuf};
use crate::utils::LocalizerError;

/// 语言文档存储 trait
///
/// # 职责
/// - 按语言标识读写语言文档的原始字节
/// - 不负责解析，仅负责 IO
pub trait LanguageStore {
    /// 读取语言文档
    ///
    /// # 返回
    /// 文档不存在或无法读取时返回 None
    fn read(&self, language: &str) -> Option<Vec<u8>>;

    /// 写入语言文档
    fn write(&self, language: &str, bytes: &[u8]) -> Result<(), LocalizerError>;

    /// 检查路径是否存在
    fn exists(&self, path: &Path) -> bool;

    /// 语言文档对应的路径
    fn document_path(&self, language: &str) -> PathBuf;

    /// 检查某种语言是否已有文档
    fn has_document(&self, language: &str) -> bool {
        self.exists(&self.document_path(language))
    }

    /// 覆盖前备份已有文档，返回备份路径（默认不备份）
    fn backup(&self, _language: &str) -> Result<Option<PathBuf>, LocalizerError> {
        Ok(None)
    }
}
