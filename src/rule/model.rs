//! 规则清单数据模型定义
//! 仅存储原始规则数据，无任何业务逻辑

use serde::Deserialize;
use serde_json::{Map, Value};

/// 远程规则清单（ClearURLs data.min.json 结构）
///
/// `providers` 保持清单中的原始顺序，该顺序即清理时的应用顺序。
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub providers: Option<Value>,
}

/// 单个规则提供方的原始定义
///
/// 仅 `urlPattern` 必填，其余字段缺省为空；未知字段（如 `completeProvider`、
/// `forceRedirection`）忽略。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProvider {
    pub url_pattern: String,
    #[serde(default)]
    pub rules: Option<Vec<String>>,
    #[serde(default)]
    pub raw_rules: Option<Vec<String>>,
    #[serde(default)]
    pub referral_marketing: Option<Vec<String>>,
    #[serde(default)]
    pub redirections: Option<Vec<String>>,
    #[serde(default)]
    pub exceptions: Option<Vec<String>>,
}

impl RawProvider {
    /// 合并 rules / rawRules / referralMarketing 三类参数规则并去重（保留首次出现顺序）
    pub fn merged_param_rules(&self) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();
        let all = [&self.rules, &self.raw_rules, &self.referral_marketing];
        for rule in all.into_iter().flatten().flatten() {
            if !merged.contains(rule) {
                merged.push(rule.clone());
            }
        }
        merged
    }
}

/// 提供方名称 -> 原始定义（保持插入顺序）
pub type ProviderMap = Map<String, Value>;
