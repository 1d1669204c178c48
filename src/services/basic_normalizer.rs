//! 文本规范化服务 - 业务能力层

use crate::capabilities::Normalizer;
use regex::Regex;

/// 基础规范化：小写、去标点、合并空白
pub struct BasicNormalizer {
    punctuation: Regex,
    whitespace: Regex,
}

impl BasicNormalizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // 保留字母、数字、撇号和空白
            punctuation: Regex::new(r"[^\p{L}\p{N}'\s]+")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }
}

impl Normalizer for BasicNormalizer {
    fn normalize(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        let stripped = self.punctuation.replace_all(&lower, " ");
        self.whitespace.replace_all(stripped.trim(), " ").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation_and_case() {
        let normalizer = BasicNormalizer::new().unwrap();
        assert_eq!(
            normalizer.normalize("Hello,   World! It's  [Music] time."),
            "hello world it's music time"
        );
    }

    #[test]
    fn test_normalize_keeps_non_latin_letters() {
        let normalizer = BasicNormalizer::new().unwrap();
        assert_eq!(normalizer.normalize("Grüße, München!"), "grüße münchen");
        assert_eq!(normalizer.normalize("東京 です。"), "東京 です");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(BasicNormalizer::new().unwrap().normalize("  ...  "), "");
    }
}
