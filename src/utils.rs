use thiserror::Error;
use std::path::{Path, PathBuf};

/// 自定义错误类型
///
/// 只覆盖调用方需要处理的致命错误（文件 IO、游戏数据 JSON 语法等）。
/// 注入过程中的非致命异常见 [`crate::injector::Anomaly`]。
#[derive(Error, Debug)]
pub enum LocalizerError {
    #[error("Missing data file: {0}")]
    MissingDataFile(PathBuf),

    #[error("Malformed language document '{language}': {source}")]
    MalformedDocument {
        language: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 解码 JSON 文本字节
///
/// 手工编辑过的语言文件经常带有 UTF-8 BOM（记事本保存），这里统一去掉。
/// 非法字节按替换字符处理，交给 JSON 解析报错。
pub fn decode_text(bytes: &[u8]) -> String {
    let (decoded, _, _had_errors) = encoding_rs::UTF_8.decode(bytes);
    decoded.into_owned()
}

/// 空白行判断（trim 后为空）
pub fn is_blank_line(line: &str) -> bool {
    line.trim().is_empty()
}

/// 创建文件备份
pub fn create_backup(file_path: &Path) -> Result<PathBuf, LocalizerError> {
    if !file_path.exists() {
        return Err(LocalizerError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "原文件不存在"
        )));
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let backup_path = file_path.with_extension(format!("{}.bak", timestamp));

    std::fs::copy(file_path, &backup_path)
        .map_err(LocalizerError::IoError)?;

    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_strips_bom() {
        let bytes = b"\xEF\xBB\xBF{\"a\":1}";
        assert_eq!(decode_text(bytes), "{\"a\":1}");
        assert_eq!(decode_text("勇者".as_bytes()), "勇者");
    }

    #[test]
    fn test_blank_line() {
        assert!(is_blank_line(""));
        assert!(is_blank_line("   "));
        assert!(is_blank_line("\t\r"));
        assert!(!is_blank_line(" a "));
        assert!(!is_blank_line("\\C[2]"));
    }

    #[test]
    fn test_create_backup() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("default.json");
        std::fs::write(&file, "{}").unwrap();

        let backup = create_backup(&file).unwrap();
        assert!(backup.exists());
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "{}");

        assert!(create_backup(&dir.path().join("missing.json")).is_err());
    }
}
