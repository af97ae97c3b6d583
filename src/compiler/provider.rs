//! 编译后的规则提供方
//! 负责单个提供方的匹配、追踪参数剥离与模拟重定向

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use url::form_urlencoded;

use crate::error::{ClearUrlsError, ClrResult};
use crate::utils::UriDecoder;

/// 带协议头的绝对地址（scheme://）
static ABSOLUTE_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("absolute url regex is valid")
});

/// 地址开头的协议名
static SCHEME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("scheme regex is valid")
});

/// 从字符串开头匹配
fn anchor_start(pattern: &str) -> String {
    format!("^(?:{})", pattern)
}

/// 完整匹配
fn anchor_full(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}

/// 单个规则提供方（编译后，创建后不可变）
#[derive(Debug, Clone)]
pub struct ProviderRule {
    name: String,
    url_pattern: Regex,
    exceptions: RegexSet,
    param_rules: RegexSet,
    redirections: Vec<Regex>,
}

impl ProviderRule {
    /// 编译一个提供方
    ///
    /// `url_pattern`、`exceptions`、`redirections` 从地址开头匹配；`param_rules`
    /// 需要完整匹配参数名。每个重定向模式至少包含一个捕获组。
    pub fn new(
        name: &str,
        url_pattern: &str,
        param_rules: &[String],
        redirections: &[String],
        exceptions: &[String],
    ) -> ClrResult<Self> {
        let url_pattern = Regex::new(&anchor_start(url_pattern))?;
        let exceptions = RegexSet::new(exceptions.iter().map(|p| anchor_start(p)))?;
        let param_rules = RegexSet::new(param_rules.iter().map(|p| anchor_full(p)))?;

        let mut compiled_redirections = Vec::with_capacity(redirections.len());
        for pattern in redirections {
            let regex = Regex::new(&anchor_start(pattern))?;
            if regex.captures_len() < 2 {
                return Err(ClearUrlsError::validation(
                    name,
                    format!("重定向模式缺少捕获组：{}", pattern),
                ));
            }
            compiled_redirections.push(regex);
        }

        Ok(Self {
            name: name.to_string(),
            url_pattern,
            exceptions,
            param_rules,
            redirections: compiled_redirections,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_rule_count(&self) -> usize {
        self.param_rules.len()
    }

    pub fn redirection_count(&self) -> usize {
        self.redirections.len()
    }

    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    /// 地址命中 url_pattern 且不命中任何例外时返回 true
    pub fn matches(&self, url: &str) -> bool {
        let url = url.trim();
        self.url_pattern.is_match(url) && !self.exceptions.is_match(url)
    }

    /// 按参数规则剥离追踪参数
    ///
    /// 保留参数维持原始顺序与原始编码；协议、主机、路径、片段不变。
    pub fn strip_params(&self, url: &str) -> String {
        let (without_fragment, fragment) = match url.find('#') {
            Some(idx) => (&url[..idx], &url[idx..]),
            None => (url, ""),
        };
        let Some(query_start) = without_fragment.find('?') else {
            return url.to_string();
        };
        let base = &without_fragment[..query_start];
        let query = &without_fragment[query_start + 1..];

        let pairs: Vec<&str> = query.split('&').filter(|pair| !pair.is_empty()).collect();
        if !pairs.iter().any(|pair| self.is_tracking_param(pair)) {
            return url.to_string();
        }

        let kept: Vec<&str> = pairs
            .into_iter()
            .filter(|pair| !self.is_tracking_param(pair))
            .collect();

        let mut cleaned = String::with_capacity(url.len());
        cleaned.push_str(base);
        if !kept.is_empty() {
            cleaned.push('?');
            cleaned.push_str(&kept.join("&"));
        }
        cleaned.push_str(fragment);
        cleaned
    }

    /// 参数名（解码后）是否命中任一参数规则
    fn is_tracking_param(&self, pair: &str) -> bool {
        form_urlencoded::parse(pair.as_bytes())
            .next()
            .is_some_and(|(key, _)| self.param_rules.is_match(&key))
    }

    /// 模拟重定向：仅采用第一个匹配的重定向模式
    ///
    /// 捕获组内容完全解码；没有协议头时借用原地址的协议。
    pub fn redirect(&self, url: &str) -> String {
        for redirection in &self.redirections {
            let Some(captures) = redirection.captures(url) else {
                continue;
            };
            let Some(target) = captures.get(1) else {
                continue;
            };

            let target = UriDecoder::decode_fully(target.as_str());
            if ABSOLUTE_URL_REGEX.is_match(&target) {
                return target;
            }

            return match SCHEME_REGEX.captures(url).and_then(|c| c.get(1)) {
                Some(scheme) => format!(
                    "{}://{}",
                    scheme.as_str(),
                    target.trim_start_matches("//")
                ),
                None => url.to_string(),
            };
        }

        url.to_string()
    }

    /// 完整清理：先剥离参数，再执行重定向
    pub fn clean(&self, url: &str) -> String {
        let stripped = self.strip_params(url);
        self.redirect(&stripped)
    }
}

impl fmt::Display for ProviderRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
