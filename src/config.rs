//! 全局配置管理,存储所有可配置项

use std::time::Duration;

/// 官方 ClearURLs 规则清单地址
pub const DEFAULT_RULES_URL: &str = "https://rules2.clearurls.xyz/data.minify.json";
/// GitLab 镜像（官方地址不可达时使用）
pub const MIRROR_RULES_URL: &str = "https://gitlab.com/ClearURLs/rules/-/raw/master/data.min.json";

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Never,     // 不重试
    Times(u8), // 固定次数重试（不含第一次）
}

impl RetryPolicy {
    /// 最大重试次数
    pub fn max_retries(&self) -> usize {
        match self {
            RetryPolicy::Never => 0,
            RetryPolicy::Times(n) => *n as usize,
        }
    }
}

/// 全局配置
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    // 规则清单地址，按顺序尝试（首个为主源，其余为镜像）
    pub rules_urls: Vec<String>,
    // 规则刷新间隔
    pub refresh_interval: Duration,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 单个地址的重试策略
    pub retry: RetryPolicy,
    // 两次重试之间的等待
    pub retry_delay: Duration,
    // 请求头 User-Agent
    pub user_agent: String,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            rules_urls: vec![DEFAULT_RULES_URL.to_string(), MIRROR_RULES_URL.to_string()],
            refresh_interval: Duration::from_secs(24 * 60 * 60),
            http_timeout: 30,
            retry: RetryPolicy::Times(1),
            retry_delay: Duration::from_secs(1),
            user_agent: format!("rsclearurls/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> CleanerConfig {
        CleanerConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: CleanerConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CleanerConfig::default(),
        }
    }

    /// 只使用单一规则地址
    pub fn rules_url(mut self, url: impl Into<String>) -> Self {
        self.config.rules_urls = vec![url.into()];
        self
    }

    pub fn rules_urls(mut self, urls: Vec<String>) -> Self {
        self.config.rules_urls = urls;
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval = interval;
        self
    }

    /// 以小时为单位设置刷新间隔
    pub fn refresh_hours(self, hours: u64) -> Self {
        self.refresh_interval(Duration::from_secs(hours.saturating_mul(60 * 60)))
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> CleanerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_official_source_first() {
        let config = ConfigManager::get_default();
        assert_eq!(config.rules_urls.first().map(String::as_str), Some(DEFAULT_RULES_URL));
        assert_eq!(config.refresh_interval, Duration::from_secs(86_400));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigManager::custom()
            .rules_url("http://localhost/rules.json")
            .refresh_hours(2)
            .retry(RetryPolicy::Never)
            .build();

        assert_eq!(config.rules_urls, vec!["http://localhost/rules.json".to_string()]);
        assert_eq!(config.refresh_interval, Duration::from_secs(7_200));
        assert_eq!(config.retry.max_retries(), 0);
        assert_eq!(RetryPolicy::Times(3).max_retries(), 3);
    }

    #[test]
    fn test_refresh_hours_saturates() {
        let config = ConfigManager::custom().refresh_hours(u64::MAX).build();
        assert_eq!(config.refresh_interval, Duration::from_secs(u64::MAX));
    }
}
