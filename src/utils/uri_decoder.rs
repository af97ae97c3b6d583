//! URI 解码工具模块
//! 负责展开重定向目标中被（可能多次）百分号编码的地址

use std::borrow::Cow;

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use tracing::debug;

/// 最大解码轮数，防止病态输入导致无限循环
pub const MAX_DECODE_ROUNDS: usize = 16;

static ENCODED_OCTET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%[0-9a-fA-F]{2}").expect("encoded octet regex is valid")
});

/// URI 解码工具类
pub struct UriDecoder;

impl UriDecoder {
    /// 是否包含至少一个 `%XX` 形式的编码字节
    pub fn is_percent_encoded(uri: &str) -> bool {
        ENCODED_OCTET_REGEX.is_match(uri)
    }

    /// 反复解码，直到不再包含编码字节
    ///
    /// 非法 UTF-8 序列按替换字符处理。超过 [`MAX_DECODE_ROUNDS`] 轮后返回当前结果。
    pub fn decode_fully(uri: &str) -> String {
        let mut current = uri.to_string();

        for _ in 0..MAX_DECODE_ROUNDS {
            if !Self::is_percent_encoded(&current) {
                return current;
            }
            current = match percent_decode_str(&current).decode_utf8_lossy() {
                Cow::Borrowed(s) => s.to_string(),
                Cow::Owned(s) => s,
            };
        }

        if Self::is_percent_encoded(&current) {
            debug!(
                "解码 {} 轮后仍含百分号编码，停止解码：{}",
                MAX_DECODE_ROUNDS, current
            );
        }
        current
    }
}
