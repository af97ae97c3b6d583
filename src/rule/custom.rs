//! 内置自定义提供方
//! 上游清单尚未覆盖的服务，每次编译都会并入提供方集合

use serde_json::{json, Value};
use tracing::debug;

use super::model::ProviderMap;

/// 内置提供方列表（名称, 原始定义）
pub fn custom_providers() -> Vec<(&'static str, Value)> {
    vec![
        (
            "vxtwitter",
            json!({
                "urlPattern": r"^https?:\/\/(?:[a-z0-9-]+\.)*?vxtwitter.com",
                "rules": [r"(?:ref_?)?src", "s", "cn", "ref_url", "t"],
                "exceptions": [r"^https?:\/\/vxtwitter.com\/i\/redirect"],
            }),
        ),
        (
            "fxtwitter",
            json!({
                "urlPattern": r"^https?:\/\/(?:[a-z0-9-]+\.)*?fxtwitter.com",
                "rules": [r"(?:ref_?)?src", "s", "cn", "ref_url", "t"],
                "exceptions": [r"^https?:\/\/fxtwitter.com\/i\/redirect"],
            }),
        ),
    ]
}

/// 将内置提供方并入上游提供方表
///
/// 同名时内置定义覆盖上游定义并保留上游位置；新名称追加在末尾。
pub fn merge_custom_providers(providers: &mut ProviderMap) {
    for (name, definition) in custom_providers() {
        if providers.insert(name.to_string(), definition).is_some() {
            debug!("内置提供方 [{}] 覆盖上游定义", name);
        }
    }
}
