//! 本地化配置
//!
//! ```json
//! {
//!   "languages": [
//!     { "language": "default", "label": "English", "languageLabel": "Language" },
//!     { "language": "french", "label": "Français", "languageLabel": "Langue" }
//!   ],
//!   "generationPolicy": "ifMissing",
//!   "joinTextLines": true
//! }
//! ```

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::utils::{decode_text, LocalizerError};
use crate::DEFAULT_LANGUAGE;

/// 一种可选语言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageEntry {
    /// 语言标识，同时是文档文件名
    pub language: String,
    /// 选中该语言时显示的名称
    pub label: String,
    /// 该语言下"语言"选项本身的标签
    #[serde(default = "default_language_label")]
    pub language_label: String,
}

fn default_language_label() -> String {
    "Language".to_string()
}

impl LanguageEntry {
    pub fn new(language: &str, label: &str, language_label: &str) -> Self {
        Self {
            language: language.to_string(),
            label: label.to_string(),
            language_label: language_label.to_string(),
        }
    }
}

/// 默认语言文档的生成策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationPolicy {
    /// 每次都重新提取（旧文档先备份）
    Always,
    /// 默认文档不存在时才提取
    #[default]
    IfMissing,
    /// 从不提取
    Never,
}

/// 本地化配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageConfig {
    /// 有序语言列表，顺序即选项窗口中的切换顺序
    pub languages: Vec<LanguageEntry>,
    pub default_language: String,
    pub generation_policy: GenerationPolicy,
    /// 为 false 时每条文字行单独成段
    pub join_text_lines: bool,
    /// 语言文档目录（相对于项目根目录）
    pub languages_dir: PathBuf,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            languages: vec![LanguageEntry::new(DEFAULT_LANGUAGE, "English", "Language")],
            default_language: DEFAULT_LANGUAGE.to_string(),
            generation_policy: GenerationPolicy::default(),
            join_text_lines: true,
            languages_dir: PathBuf::from("data/languages"),
        }
    }
}

impl LanguageConfig {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LocalizerError> {
        let mut config: Self = serde_json::from_str(&decode_text(bytes))?;
        config.normalize();
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, LocalizerError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// 默认语言必须出现在列表中，否则插到最前面
    fn normalize(&mut self) {
        if self.languages.iter().all(|entry| entry.language != self.default_language) {
            tracing::debug!("Default language '{}' not listed, prepending it", self.default_language);
            self.languages.insert(
                0,
                LanguageEntry::new(&self.default_language, &self.default_language, &default_language_label()),
            );
        }
    }

    pub fn position(&self, language: &str) -> Option<usize> {
        self.languages.iter().position(|entry| entry.language == language)
    }

    pub fn is_default(&self, language: &str) -> bool {
        self.default_language == language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LanguageConfig::default();
        assert_eq!(config.languages.len(), 1);
        assert_eq!(config.position("default"), Some(0));
        assert_eq!(config.generation_policy, GenerationPolicy::IfMissing);
        assert!(config.join_text_lines);
    }

    #[test]
    fn test_parse_partial_config() {
        let json = br#"{
            "languages": [
                {"language": "default", "label": "English"},
                {"language": "french", "label": "Francais", "languageLabel": "Langue"}
            ],
            "generationPolicy": "always",
            "joinTextLines": false
        }"#;
        let config = LanguageConfig::from_bytes(json).unwrap();
        assert_eq!(config.languages[0].language_label, "Language");
        assert_eq!(config.languages[1].language_label, "Langue");
        assert_eq!(config.generation_policy, GenerationPolicy::Always);
        assert!(!config.join_text_lines);
        assert_eq!(config.languages_dir, PathBuf::from("data/languages"));
    }

    #[test]
    fn test_unlisted_default_is_prepended() {
        let json = br#"{"languages": [{"language": "french", "label": "Francais"}]}"#;
        let config = LanguageConfig::from_bytes(json).unwrap();
        assert_eq!(config.position("default"), Some(0));
        assert_eq!(config.position("french"), Some(1));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let json = br#"{"generationPolicy": "sometimes"}"#;
        assert!(matches!(LanguageConfig::from_bytes(json), Err(LocalizerError::JsonError(_))));
    }
}
