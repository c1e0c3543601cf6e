//! Firebase 后端（预留）
//!
//! 所有操作记录告警并返回 `ProviderUnavailable`。

use async_trait::async_trait;
use tracing::warn;

use super::CouponBackend;
use crate::error::{CouponError, Result};
use crate::models::{CouponDraft, CouponRecord};

const PROVIDER_NAME: &str = "Firebase";

#[derive(Debug, Default)]
pub struct FirebaseBackend;

impl FirebaseBackend {
    pub fn new() -> Self {
        Self
    }

    fn unavailable(&self, operation: &str) -> CouponError {
        warn!(operation, "{} implementation not yet available", PROVIDER_NAME);
        CouponError::ProviderUnavailable {
            provider: PROVIDER_NAME.to_string(),
        }
    }
}

#[async_trait]
impl CouponBackend for FirebaseBackend {
    fn name(&self) -> &'static str {
        "firebase"
    }

    async fn create(&self, _draft: CouponDraft) -> Result<CouponRecord> {
        Err(self.unavailable("create"))
    }

    async fn get_by_id(&self, _id: &str) -> Result<CouponRecord> {
        Err(self.unavailable("get_by_id"))
    }

    async fn list(&self) -> Result<Vec<CouponRecord>> {
        Err(self.unavailable("list"))
    }

    async fn increment_scan_count(&self, _id: &str) -> Result<bool> {
        Err(self.unavailable("increment_scan_count"))
    }

    async fn upload_image(&self, _bytes: &[u8], _path: &str) -> Result<String> {
        Err(self.unavailable("upload_image"))
    }

    async fn get_image_url(&self, _key: &str) -> Result<String> {
        Err(self.unavailable("get_image_url"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_operation_unavailable() {
        let backend = FirebaseBackend::new();

        let err = backend.list().await.unwrap_err();
        assert_eq!(err.to_string(), "Firebase implementation not yet available");
        assert!(matches!(
            backend.get_by_id("1").await,
            Err(CouponError::ProviderUnavailable { .. })
        ));
        assert!(backend.increment_scan_count("1").await.is_err());
        assert!(backend.upload_image(b"x", "a.png").await.is_err());
        assert!(backend.get_image_url("a.png").await.is_err());
        assert!(
            backend
                .create(CouponDraft::new("a", "b", "1"))
                .await
                .is_err()
        );
    }
}
