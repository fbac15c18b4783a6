pub mod command;
pub mod config;
pub mod database;
pub mod document;
pub mod extractor;
pub mod injector;
pub mod io;
pub mod session;
pub mod text_run;
pub mod utils;

// 重新导出主要结构
pub use config::{GenerationPolicy, LanguageConfig, LanguageEntry};
pub use database::GameDatabase;
pub use document::LanguageDocument;
pub use extractor::{extract, ExtractOptions};
pub use injector::{inject, inject_map, Anomaly, InjectionReport};
pub use io::{FsLanguageStore, LanguageStore, MemoryLanguageStore};
pub use session::LanguageSession;
pub use text_run::{Anchor, TextRun};
pub use utils::LocalizerError;

// 常量定义
pub const DEFAULT_LANGUAGE: &str = "default";
pub const DATA_DIR: &str = "data";
