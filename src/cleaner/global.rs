//! 全局清理器单例管理
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use super::cleaner::Cleaner;
use crate::config::{CleanerConfig, ConfigManager};
use crate::error::{ClearUrlsError, ClrResult};

/// 全局清理器实例
static GLOBAL_CLEANER: Lazy<Arc<OnceCell<Cleaner>>> = Lazy::new(|| Arc::new(OnceCell::new()));

/// 初始化全局清理器（默认配置）
pub async fn init_clear_urls() -> ClrResult<()> {
    init_clear_urls_with_config(ConfigManager::get_default()).await
}

/// 带自定义配置初始化全局清理器，已初始化时直接返回
pub async fn init_clear_urls_with_config(config: CleanerConfig) -> ClrResult<()> {
    if GLOBAL_CLEANER.get().is_some() {
        debug!("全局清理器已初始化，跳过重复初始化");
        return Ok(());
    }

    GLOBAL_CLEANER
        .get_or_try_init(|| async move { Cleaner::new(config) })
        .await?;
    Ok(())
}

/// 获取全局清理器
pub(crate) fn get_global_cleaner() -> ClrResult<&'static Cleaner> {
    GLOBAL_CLEANER.get().ok_or_else(|| {
        ClearUrlsError::NoProviders("全局清理器未初始化".to_string())
    })
}

/// 使用全局清理器清除链接追踪信息（未初始化时按默认配置初始化）
pub async fn strip_trackers(dirty_url: &str) -> ClrResult<String> {
    if GLOBAL_CLEANER.get().is_none() {
        init_clear_urls().await?;
    }
    get_global_cleaner()?.strip_trackers(dirty_url).await
}
