/// IO 抽象层模块
///
/// 编解码本身不做任何 IO：语言文档以字节形式经由 [`LanguageStore`] 读写，
/// 字节如何落盘（本地文件、内存、网络）由实现决定。
///
/// # 架构设计
///
/// - **traits**: 定义 LanguageStore trait 接口
/// - **fs_store**: 基于文件系统的默认实现（`<目录>/<语言>.json`）
/// - **memory_store**: 内存实现，用于测试和嵌入
///
/// # 使用示例
///
/// ```rust,ignore
/// use rmmv_localizer::io::{FsLanguageStore, LanguageStore};
///
/// let store = FsLanguageStore::new("data/languages");
/// let bytes = store.read("english");
/// ```
pub mod traits;
pub mod fs_store;
pub mod memory_store;

// === 导出 trait 定义 ===
pub use traits::LanguageStore;

// === 导出默认实现 ===
pub use fs_store::FsLanguageStore;
pub use memory_store::MemoryLanguageStore;
