//! 规则提供方注册表
//! 持有当前生效的提供方快照，过期时从 RuleSource 刷新

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::compiler::{ManifestCompiler, ProviderRule};
use crate::error::ClrResult;
use crate::rule::{FetchOutcome, RuleSource};
use crate::utils::Clock;

/// 刷新相关的可变状态，统一由一把锁保护
struct RegistryState {
    source: RuleSource,
    providers: Arc<Vec<ProviderRule>>,
    last_refresh_at: Option<Instant>,
}

/// 提供方注册表
///
/// 过期检查、拉取、编译、替换在同一把锁内完成，并发调用不会重复刷新。
/// 提供方列表一旦非空，失败或无变化的刷新都不会把它清空。
pub struct ProviderRegistry {
    state: Mutex<RegistryState>,
    refresh_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl ProviderRegistry {
    pub fn new(source: RuleSource, refresh_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                source,
                providers: Arc::new(Vec::new()),
                last_refresh_at: None,
            }),
            refresh_interval,
            clock,
        }
    }

    /// 预置提供方列表（仍会在首次使用时尝试刷新）
    pub fn with_providers(mut self, providers: Vec<ProviderRule>) -> Self {
        self.state.get_mut().providers = Arc::new(providers);
        self
    }

    /// 当前提供方快照
    pub async fn current_providers(&self) -> Arc<Vec<ProviderRule>> {
        self.state.lock().await.providers.clone()
    }

    /// 上次成功拉取内容的校验和
    pub async fn checksum(&self) -> Option<String> {
        self.state.lock().await.source.checksum().map(str::to_string)
    }

    /// 当前是否需要刷新
    pub async fn is_stale(&self) -> bool {
        let state = self.state.lock().await;
        self.stale_at(state.last_refresh_at, self.clock.now())
    }

    fn stale_at(&self, last_refresh_at: Option<Instant>, now: Instant) -> bool {
        match last_refresh_at {
            Some(last) => now.saturating_duration_since(last) >= self.refresh_interval,
            None => true,
        }
    }

    /// 确保规则未过期，返回当前快照
    ///
    /// 刷新失败且从未加载过提供方时返回错误；否则保留旧列表。
    pub async fn ensure_fresh(&self) -> ClrResult<Arc<Vec<ProviderRule>>> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        if self.stale_at(state.last_refresh_at, now) {
            debug!("ClearURLs 规则已过期，开始刷新");
            Self::refresh_locked(&mut state, now).await?;
        }
        Ok(state.providers.clone())
    }

    /// 强制刷新
    pub async fn refresh(&self) -> ClrResult<()> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        Self::refresh_locked(&mut state, now).await
    }

    async fn refresh_locked(state: &mut RegistryState, now: Instant) -> ClrResult<()> {
        let fetched = state.source.fetch().await;
        let result = match fetched {
            Ok(FetchOutcome::Updated(rules)) => {
                let compiled = ManifestCompiler::compile_all(&rules);
                if compiled.is_err() {
                    // 编译失败的内容不算已加载
                    state.source.reset_checksum();
                }
                compiled.map(Some)
            }
            Ok(FetchOutcome::Unchanged) | Ok(FetchOutcome::Empty) => Ok(None),
            Err(e) => Err(e),
        };

        match result {
            Ok(Some(providers)) if !providers.is_empty() => {
                info!("✅ 已加载 {} 个 ClearURLs 提供方", providers.len());
                state.providers = Arc::new(providers);
            }
            Ok(Some(_)) => {
                warn!("规则清单未产生任何提供方，继续使用旧列表");
            }
            Ok(None) => {}
            Err(e) => {
                // 从未加载过提供方时无法继续
                if state.providers.is_empty() {
                    return Err(e);
                }
                warn!(
                    "拉取新的 ClearURLs 规则失败，继续使用 {} 个旧提供方：{}",
                    state.providers.len(),
                    e
                );
            }
        }

        // 列表为空时不记录刷新时间，下次调用立即重试
        if !state.providers.is_empty() {
            state.last_refresh_at = Some(now);
        }
        Ok(())
    }
}
