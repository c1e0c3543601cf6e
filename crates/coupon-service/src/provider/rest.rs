//! 远程 API 后端
//!
//! 通过 HTTP 调用远程优惠券服务。id 与时间戳在客户端生成后整条记录提交，
//! 扫码计数由服务端原子完成。

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, error, instrument};
use uuid::Uuid;

use coupon_shared::RestProviderConfig;

use super::CouponBackend;
use crate::api::{ObjectKeyResponse, ObjectUrlResponse};
use crate::error::{CouponError, Result};
use crate::models::{Coupon, CouponDraft, CouponRecord};

/// 远程 API 后端
pub struct RestBackend {
    client: Client,
    base_url: Url,
}

impl RestBackend {
    /// 根据配置创建 HTTP 客户端
    pub fn new(config: &RestProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CouponError::Config(format!("HTTP 客户端初始化失败: {}", e)))?;

        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                CouponError::Config(format!("base_url inválida: {}", config.base_url))
            })?;

        Ok(Self { client, base_url })
    }

    /// 在基础地址后追加路径段，每段单独转义
    ///
    /// id 与 key 中的 `/`、`?`、`#`、`%` 不会改变请求的资源
    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CouponError::Config(format!("base_url inválida: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// 对象 key 按 `/` 拆分为路径段
fn object_segments<'a>(prefix: &'a str, key: &'a str) -> impl Iterator<Item = &'a str> {
    std::iter::once(prefix).chain(key.split('/'))
}

/// 非 2xx 响应转换为错误，404 使用调用方给出的 not-found 错误
fn check_status(response: Response, not_found: impl FnOnce() -> CouponError) -> Result<Response> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(not_found()),
        status if !status.is_success() => Err(CouponError::Transport(format!(
            "HTTP {} {}",
            status,
            response.url()
        ))),
        _ => Ok(response),
    }
}

#[async_trait]
impl CouponBackend for RestBackend {
    fn name(&self) -> &'static str {
        "rest"
    }

    #[instrument(skip(self, draft))]
    async fn create(&self, draft: CouponDraft) -> Result<CouponRecord> {
        let coupon = Coupon::from_draft(Uuid::new_v4().to_string(), draft, Utc::now());
        let record = coupon.to_record();

        let response = self
            .client
            .post(self.url(["coupons"])?)
            .json(&record)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "创建优惠券请求失败");
                CouponError::Creation(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, coupon_id = %record.id, "远程服务拒绝创建优惠券");
            return Err(CouponError::Creation(format!("HTTP {}", status)));
        }

        debug!(coupon_id = %record.id, "优惠券已提交");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> Result<CouponRecord> {
        let response = self
            .client
            .get(self.url(["coupons", id])?)
            .send()
            .await?;

        let response = check_status(response, || CouponError::CouponNotFound(id.to_string()))?;
        Ok(response.json::<CouponRecord>().await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<CouponRecord>> {
        let response = self.client.get(self.url(["coupons"])?).send().await?;

        let response = check_status(response, || {
            CouponError::Transport("endpoint /coupons no disponible".to_string())
        })?;
        Ok(response.json::<Vec<CouponRecord>>().await?)
    }

    #[instrument(skip(self))]
    async fn increment_scan_count(&self, id: &str) -> Result<bool> {
        let response = self
            .client
            .put(self.url(["coupons", id, "scan"])?)
            .send()
            .await?;

        check_status(response, || CouponError::CouponNotFound(id.to_string()))?;
        Ok(true)
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload_image(&self, bytes: &[u8], path: &str) -> Result<String> {
        let response = self
            .client
            .put(self.url(object_segments("objects", path))?)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await?;

        let response = check_status(response, || {
            CouponError::Transport(format!("no se pudo guardar el objeto {}", path))
        })?;
        Ok(response.json::<ObjectKeyResponse>().await?.key)
    }

    #[instrument(skip(self))]
    async fn get_image_url(&self, key: &str) -> Result<String> {
        let response = self
            .client
            .get(self.url(object_segments("object-urls", key))?)
            .send()
            .await?;

        let response = check_status(response, || CouponError::ImageNotFound(key.to_string()))?;
        Ok(response.json::<ObjectUrlResponse>().await?.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest_backend(base_url: &str) -> RestBackend {
        RestBackend::new(&RestProviderConfig {
            base_url: base_url.to_string(),
            timeout_ms: 1000,
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = rest_backend("http://api.test/");

        assert_eq!(backend.url(["coupons"]).unwrap().as_str(), "http://api.test/coupons");
        assert_eq!(
            rest_backend("http://api.test/v1/").url(["coupons", "7", "scan"]).unwrap().as_str(),
            "http://api.test/v1/coupons/7/scan"
        );
        assert_eq!(backend.name(), "rest");
    }

    #[test]
    fn test_segments_are_escaped() {
        let backend = rest_backend("http://api.test");

        assert_eq!(
            backend.url(["coupons", "a?x=1#frag"]).unwrap().as_str(),
            "http://api.test/coupons/a%3Fx=1%23frag"
        );
        assert_eq!(
            backend.url(["coupons", "50% off/2"]).unwrap().as_str(),
            "http://api.test/coupons/50%25%20off%2F2"
        );
        assert_eq!(
            backend
                .url(object_segments("objects", "logos/a#1.png"))
                .unwrap()
                .as_str(),
            "http://api.test/objects/logos/a%231.png"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = RestBackend::new(&RestProviderConfig {
            base_url: "not a url".to_string(),
            timeout_ms: 1000,
        });
        assert!(matches!(result, Err(CouponError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let backend = rest_backend("http://127.0.0.1:1");

        let err = backend.get_by_id("1").await.unwrap_err();
        assert!(err.is_retryable());

        let err = backend
            .create(CouponDraft::new("Promo", "Tienda", "5"))
            .await
            .unwrap_err();
        assert!(matches!(err, CouponError::Creation(_)));
    }
}
