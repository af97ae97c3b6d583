//! 规则清单拉取管理器
//! 负责从远程地址拉取 ClearURLs 规则清单，并通过内容校验和判断是否有更新

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::{CleanerConfig, RetryPolicy};
use crate::error::{ClearUrlsError, ClrResult};

/// 规则清单拉取接口（测试中可替换为模拟实现）
#[async_trait]
pub trait ManifestFetcher: Send + Sync {
    /// 拉取指定地址的原始文本
    async fn fetch_text(&self, url: &str) -> ClrResult<String>;
}

/// 基于 reqwest 的 HTTP 拉取器
#[derive(Debug, Clone)]
pub struct HttpManifestFetcher {
    client: Client,
}

impl HttpManifestFetcher {
    pub fn new(config: &CleanerConfig) -> ClrResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ManifestFetcher for HttpManifestFetcher {
    async fn fetch_text(&self, url: &str) -> ClrResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClearUrlsError::NetworkError(format!(
                "URL {} 返回状态码 {}",
                url,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

/// 单次拉取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 内容有变化，携带新的原始文本
    Updated(String),
    /// 内容与上次一致
    Unchanged,
    /// 响应体为空
    Empty,
}

/// 规则来源：拉取 + 校验和去重
pub struct RuleSource {
    fetcher: Arc<dyn ManifestFetcher>,
    urls: Vec<String>,
    retry: RetryPolicy,
    retry_delay: Duration,
    checksum: Option<String>,
}

impl RuleSource {
    pub fn new(fetcher: Arc<dyn ManifestFetcher>, config: &CleanerConfig) -> Self {
        Self {
            fetcher,
            urls: config.rules_urls.clone(),
            retry: config.retry,
            retry_delay: config.retry_delay,
            checksum: None,
        }
    }

    /// 上次成功拉取内容的校验和
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// 丢弃已记录的校验和，下次拉取一定返回新内容
    pub fn reset_checksum(&mut self) {
        self.checksum = None;
    }

    /// 计算规则文本的 SHA-256 校验和（十六进制）
    pub fn compute_checksum(rules: &str) -> String {
        hex::encode(Sha256::digest(rules.as_bytes()))
    }

    /// 拉取规则清单
    ///
    /// 按顺序尝试所有地址，首个成功的地址生效；仅当内容校验和变化时返回新文本。
    pub async fn fetch(&mut self) -> ClrResult<FetchOutcome> {
        info!("开始拉取 ClearURLs 规则清单...");
        let data = self.download_any().await?;
        let data = data.trim();

        if data.is_empty() {
            warn!("ClearURLs 规则清单响应为空");
            return Ok(FetchOutcome::Empty);
        }

        let new_checksum = Self::compute_checksum(data);
        if self.checksum.as_deref() == Some(new_checksum.as_str()) {
            debug!("规则清单未变化（校验和 {}）", new_checksum);
            return Ok(FetchOutcome::Unchanged);
        }

        debug!("规则清单已更新，新校验和 {}", new_checksum);
        self.checksum = Some(new_checksum);
        Ok(FetchOutcome::Updated(data.to_string()))
    }

    /// 依次尝试主源与镜像
    async fn download_any(&self) -> ClrResult<String> {
        let mut last_err: Option<ClearUrlsError> = None;

        for url in &self.urls {
            debug!("从 {} 拉取规则清单", url);
            match self.download_with_retry(url).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("从 {} 拉取规则清单失败：{}", url, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ClearUrlsError::NetworkError("未配置任何规则清单地址".to_string())
        }))
    }

    /// 单个地址的重试逻辑
    async fn download_with_retry(&self, url: &str) -> ClrResult<String> {
        let max_retries = self.retry.max_retries();
        let mut last_err: Option<ClearUrlsError> = None;

        for attempt in 0..=max_retries {
            match self.fetcher.fetch_text(url).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    last_err = Some(e);
                    if attempt < max_retries {
                        warn!(
                            "请求失败，正在重试（第 {}/{} 次）",
                            attempt + 1,
                            max_retries
                        );
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ClearUrlsError::NetworkError("所有重试均已失败".to_string())
        }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::config::ConfigManager;

    /// 模拟拉取器：按地址返回预设内容，并记录调用次数
    #[derive(Default)]
    pub(crate) struct MockFetcher {
        responses: Mutex<HashMap<String, Result<String, String>>>,
        calls: AtomicUsize,
    }

    impl MockFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(&self, url: &str, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Ok(body.to_string()));
        }

        pub(crate) fn fail(&self, url: &str, reason: &str) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Err(reason.to_string()));
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ManifestFetcher for MockFetcher {
        async fn fetch_text(&self, url: &str) -> ClrResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.lock().unwrap().get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(reason)) => Err(ClearUrlsError::NetworkError(reason.clone())),
                None => Err(ClearUrlsError::NetworkError(format!("no route to {}", url))),
            }
        }
    }

    const PRIMARY: &str = "http://rules.test/data.json";
    const MIRROR: &str = "http://mirror.test/data.json";

    fn source(fetcher: Arc<MockFetcher>, retry: RetryPolicy) -> RuleSource {
        let config = ConfigManager::custom()
            .rules_urls(vec![PRIMARY.to_string(), MIRROR.to_string()])
            .retry(retry)
            .retry_delay(Duration::from_millis(1))
            .build();
        RuleSource::new(fetcher, &config)
    }

    #[test]
    fn test_http_fetcher_applies_user_agent_on_client() {
        let config = ConfigManager::custom().user_agent("rsclearurls-test/1.0").build();
        assert!(HttpManifestFetcher::new(&config).is_ok());

        // 非法 User-Agent 在构建客户端时即被拒绝
        let config = ConfigManager::custom().user_agent("bad\nagent").build();
        assert!(matches!(
            HttpManifestFetcher::new(&config),
            Err(ClearUrlsError::HttpError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_reports_updated_then_unchanged() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.respond(PRIMARY, "  {\"providers\":{}}\n");
        let mut source = source(fetcher.clone(), RetryPolicy::Never);

        let first = source.fetch().await.unwrap();
        assert_eq!(first, FetchOutcome::Updated("{\"providers\":{}}".to_string()));
        assert_eq!(
            source.checksum(),
            Some(RuleSource::compute_checksum("{\"providers\":{}}").as_str())
        );

        let second = source.fetch().await.unwrap();
        assert_eq!(second, FetchOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_fetch_empty_body() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.respond(PRIMARY, "   \n");
        let mut source = source(fetcher, RetryPolicy::Never);

        assert_eq!(source.fetch().await.unwrap(), FetchOutcome::Empty);
        assert!(source.checksum().is_none());
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_mirror() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.fail(PRIMARY, "connection refused");
        fetcher.respond(MIRROR, "{\"providers\":{\"a\":{}}}");
        let mut source = source(fetcher.clone(), RetryPolicy::Times(2));

        let outcome = source.fetch().await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Updated(_)));
        // 主源 1 次 + 2 次重试，镜像 1 次
        assert_eq!(fetcher.calls(), 4);
    }

    #[tokio::test]
    async fn test_fetch_all_sources_fail() {
        let fetcher = Arc::new(MockFetcher::new());
        let mut source = source(fetcher.clone(), RetryPolicy::Never);

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, ClearUrlsError::NetworkError(_)));
        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn test_checksum_is_sha256_hex() {
        let checksum = RuleSource::compute_checksum("abc");
        assert_eq!(
            checksum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
