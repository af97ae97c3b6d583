//! 清理模块：提供方注册表、清理器与全局入口
pub mod registry;
pub mod cleaner;
pub mod global;

// 导出核心接口
pub use self::registry::ProviderRegistry;
pub use self::cleaner::Cleaner;
pub use self::global::{init_clear_urls, init_clear_urls_with_config, strip_trackers};
