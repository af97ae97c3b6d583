//! 规则模块：负责规则清单的拉取、数据模型定义与内置提供方
pub mod model;
pub mod custom;
pub mod loader;

// 导出核心接口
pub use self::model::{RawManifest, RawProvider, ProviderMap};
pub use self::custom::{custom_providers, merge_custom_providers};
pub use self::loader::{FetchOutcome, HttpManifestFetcher, ManifestFetcher, RuleSource};
