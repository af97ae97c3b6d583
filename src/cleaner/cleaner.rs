//! 清理器核心：对外提供 strip_trackers 入口
use std::sync::Arc;

use tracing::debug;

use super::registry::ProviderRegistry;
use crate::config::CleanerConfig;
use crate::error::{ClearUrlsError, ClrResult};
use crate::rule::{HttpManifestFetcher, ManifestFetcher, RuleSource};
use crate::utils::{Clock, SystemClock};

/// 链接追踪参数清理器
pub struct Cleaner {
    registry: ProviderRegistry,
}

impl Cleaner {
    /// 使用 HTTP 拉取器与系统时钟创建清理器（不会立即拉取规则）
    pub fn new(config: CleanerConfig) -> ClrResult<Self> {
        let fetcher = Arc::new(HttpManifestFetcher::new(&config)?);
        Ok(Self::with_fetcher(&config, fetcher, Arc::new(SystemClock)))
    }

    /// 自定义拉取器与时钟
    pub fn with_fetcher(
        config: &CleanerConfig,
        fetcher: Arc<dyn ManifestFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let source = RuleSource::new(fetcher, config);
        Self::from_registry(ProviderRegistry::new(source, config.refresh_interval, clock))
    }

    pub fn from_registry(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// 清除链接中的全部追踪信息
    ///
    /// 规则过期时先刷新；按注册表顺序依次应用所有匹配该链接的提供方。
    /// 没有任何可用提供方时返回 [`ClearUrlsError::NoProviders`]。
    pub async fn strip_trackers(&self, dirty_url: &str) -> ClrResult<String> {
        let dirty_url = dirty_url.trim();

        let providers = self.registry.ensure_fresh().await.map_err(|e| {
            ClearUrlsError::NoProviders(format!(
                "清理链接 {} 的追踪参数失败：{}",
                dirty_url, e
            ))
        })?;

        if providers.is_empty() {
            return Err(ClearUrlsError::NoProviders(format!(
                "清理链接 {} 的追踪参数失败：没有可用的 ClearURLs 提供方",
                dirty_url
            )));
        }

        let cleaned = providers
            .iter()
            .filter(|provider| provider.matches(dirty_url))
            .fold(dirty_url.to_string(), |url, provider| {
                debug!("应用 ClearURLs 提供方 [{}]", provider);
                provider.clean(&url)
            });

        Ok(cleaned)
    }
}
