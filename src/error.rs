//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;

#[derive(Error, Debug)]
pub enum ClearUrlsError {
    // 规则清单相关错误
    #[error("规则清单格式错误：{0}")]
    ManifestFormat(String),
    #[error("规则提供方 [{provider}] 校验失败：{reason}")]
    ProviderValidation { provider: String, reason: String },

    // 编译相关错误
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),

    // 清理相关错误
    #[error("无可用规则提供方：{0}")]
    NoProviders(String),

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),
    #[error("网络相关错误：{0}")]
    NetworkError(String),

    // 基础错误
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

impl ClearUrlsError {
    /// 构造单个提供方的校验错误
    pub fn validation(provider: &str, reason: impl Into<String>) -> Self {
        Self::ProviderValidation {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

// 全局Result类型
pub type ClrResult<T> = Result<T, ClearUrlsError>;
