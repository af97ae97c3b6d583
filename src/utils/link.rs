//! 链接提取与校验工具

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::{ClearUrlsError, ClrResult};

static LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://\S+").expect("link regex is valid")
});

/// 判断输入是否为带主机名的 http/https 绝对地址
pub fn is_url(text: &str) -> bool {
    match Url::parse(text.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// 链接末尾不属于地址的句读与括号
const TRAILING_PUNCTUATION: &[char] = &[')', '.', ',', '>'];

/// 从一段文本中提取第一个链接（去掉末尾的句读）
pub fn extract_link(text: &str) -> ClrResult<String> {
    LINK_REGEX
        .find(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION).to_string())
        .ok_or_else(|| ClearUrlsError::InvalidInput(format!("文本中没有可提取的链接：{}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/page?utm_source=test"));
        assert!(is_url("  http://example.com  "));
        assert!(!is_url("not-a-valid-url"));
        assert!(!is_url("ftp://example.com/file"));
    }

    #[test]
    fn test_extract_link_from_text() {
        let text = "Check out this link: https://example.com/page?utm_source=test and more";
        assert_eq!(
            extract_link(text).unwrap(),
            "https://example.com/page?utm_source=test"
        );
    }

    #[test]
    fn test_extract_link_drops_trailing_punctuation() {
        assert_eq!(extract_link("see https://a.com/x).").unwrap(), "https://a.com/x");
        assert_eq!(extract_link("<https://a.com/y>, thanks").unwrap(), "https://a.com/y");
        assert_eq!(extract_link("https://a.com/z?q=1").unwrap(), "https://a.com/z?q=1");
    }

    #[test]
    fn test_extract_link_missing() {
        assert!(matches!(
            extract_link("No link here"),
            Err(ClearUrlsError::InvalidInput(_))
        ));
    }
}
