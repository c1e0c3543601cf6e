//! 分享链接
//!
//! 生成兑换页面链接与二维码图片文件名。

use regex::Regex;

/// 分享链接生成器
#[derive(Debug, Clone)]
pub struct ShareLinks {
    base_url: String,
    /// 非字母数字、非空白字符
    symbol_regex: Regex,
    whitespace_regex: Regex,
}

impl ShareLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            symbol_regex: Regex::new(r"[^A-Za-z0-9_\s]").unwrap(),
            whitespace_regex: Regex::new(r"\s+").unwrap(),
        }
    }

    /// 兑换页面链接：`{base}/redeem/{id}`
    pub fn redeem_url(&self, coupon_id: &str) -> String {
        format!("{}/redeem/{}", self.base_url, coupon_id)
    }

    /// 二维码文件名：`qr-coupon-{title}-{timestamp_ms}`
    ///
    /// 标题转小写，去掉符号，空白折叠为 `-`
    pub fn qr_filename(&self, title: &str, timestamp_ms: i64) -> String {
        let lowered = title.to_lowercase();
        let stripped = self.symbol_regex.replace_all(&lowered, "");
        let slug = self.whitespace_regex.replace_all(&stripped, "-");
        format!("qr-coupon-{}-{}", slug, timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redeem_url() {
        let links = ShareLinks::new("https://cupones.example.com/");
        assert_eq!(
            links.redeem_url("abc-123"),
            "https://cupones.example.com/redeem/abc-123"
        );
    }

    #[test]
    fn test_qr_filename() {
        let links = ShareLinks::new("http://localhost:3000");

        assert_eq!(
            links.qr_filename("Promo Verano 2x1!", 1_700_000_000_000),
            "qr-coupon-promo-verano-2x1-1700000000000"
        );
        assert_eq!(
            links.qr_filename("Café  & Té", 5),
            "qr-coupon-caf-t-5"
        );
    }
}
