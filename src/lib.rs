//! rsclearurls - ClearURLs 规则驱动的链接追踪参数清理引擎

// 导出全局错误类型
pub use self::error::{ClearUrlsError, ClrResult};

// 导出配置模块
pub use self::config::{CleanerConfig, ConfigManager, CustomConfigBuilder, RetryPolicy};

// 导出规则模块核心接口
pub use self::rule::{
    FetchOutcome, HttpManifestFetcher, ManifestFetcher, RawManifest, RawProvider, RuleSource,
};

// 导出编译模块核心接口
pub use self::compiler::{ManifestCompiler, ProviderRule};

// 导出清理模块核心接口
pub use self::cleaner::{
    Cleaner, ProviderRegistry, init_clear_urls, init_clear_urls_with_config, strip_trackers,
};

// 导出工具模块核心接口
pub use self::utils::{Clock, SystemClock, UriDecoder, extract_link, is_url};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod compiler;
pub mod cleaner;
pub mod utils;
