//! 规则清单编译器核心
//! 负责校验原始提供方定义，并编译为可执行的 ProviderRule

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, info};

use super::provider::ProviderRule;
use crate::error::{ClearUrlsError, ClrResult};
use crate::rule::{merge_custom_providers, ProviderMap, RawManifest, RawProvider};

/// 编译统计
#[derive(Debug, Default)]
struct CompileStats {
    compiled: usize,
    skipped: usize,
    param_rules: usize,
    redirections: usize,
    exceptions: usize,
}

/// 规则清单编译器
pub struct ManifestCompiler;

impl ManifestCompiler {
    /// 编译完整规则清单
    ///
    /// 仅当 JSON 无法解析、缺少 `providers` 或其为空时整体失败；单个提供方
    /// 校验/编译失败只记录日志并跳过。内置提供方在编译前并入（同名覆盖上游）。
    pub fn compile_all(rules: &str) -> ClrResult<Vec<ProviderRule>> {
        info!("开始编译 ClearURLs 提供方...");
        let start = Instant::now();

        let mut providers = Self::parse_provider_map(rules)?;
        merge_custom_providers(&mut providers);

        let mut stats = CompileStats::default();
        let mut compiled = Vec::with_capacity(providers.len());
        for (name, definition) in &providers {
            match Self::compile_provider(name, definition) {
                Ok(provider) => {
                    stats.compiled += 1;
                    stats.param_rules += provider.param_rule_count();
                    stats.redirections += provider.redirection_count();
                    stats.exceptions += provider.exception_count();
                    compiled.push(provider);
                }
                Err(e) => {
                    stats.skipped += 1;
                    error!("ClearURLs 提供方 [{}] 校验失败，已跳过：{}", name, e);
                }
            }
        }

        debug!(
            "编译 {} 个提供方（跳过 {} 个），耗时 {:?}：参数规则 {} 条，重定向 {} 条，例外 {} 条",
            stats.compiled,
            stats.skipped,
            start.elapsed(),
            stats.param_rules,
            stats.redirections,
            stats.exceptions
        );
        Ok(compiled)
    }

    /// 校验并编译单个提供方定义
    pub fn compile_provider(name: &str, definition: &Value) -> ClrResult<ProviderRule> {
        let raw: RawProvider = serde_json::from_value(definition.clone())
            .map_err(|e| ClearUrlsError::validation(name, e.to_string()))?;

        ProviderRule::new(
            name,
            &raw.url_pattern,
            &raw.merged_param_rules(),
            raw.redirections.as_deref().unwrap_or_default(),
            raw.exceptions.as_deref().unwrap_or_default(),
        )
    }

    /// 解析顶层 `providers` 表
    fn parse_provider_map(rules: &str) -> ClrResult<ProviderMap> {
        let manifest: RawManifest = serde_json::from_str(rules).map_err(|e| {
            ClearUrlsError::ManifestFormat(format!("无法解析规则清单：{}", e))
        })?;

        match manifest.providers {
            Some(Value::Object(map)) if !map.is_empty() => Ok(map),
            Some(Value::Object(_)) => Err(ClearUrlsError::ManifestFormat(
                "`providers` 为空".to_string(),
            )),
            Some(_) => Err(ClearUrlsError::ManifestFormat(
                "`providers` 不是对象".to_string(),
            )),
            None => Err(ClearUrlsError::ManifestFormat(
                "缺少 `providers` 字段".to_string(),
            )),
        }
    }
}
