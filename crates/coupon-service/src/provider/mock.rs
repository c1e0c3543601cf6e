//! 内存后端
//!
//! 不依赖任何外部服务，适用于本地开发与测试。
//! 每个操作按配置模拟网络延迟，默认预置一张示例优惠券与一张示例图片。

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use coupon_shared::MockProviderConfig;

use super::CouponBackend;
use crate::error::{CouponError, Result};
use crate::models::{Coupon, CouponDraft, CouponRecord, DiscountType, RedirectType};
use crate::store::MemoryStore;

/// 示例优惠券 id
pub const SAMPLE_COUPON_ID: &str = "1";

/// 上传图片后返回的占位 URL
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300";

const SAMPLE_LOGO_URL: &str = "https://via.placeholder.com/150";
const SAMPLE_IMAGE_KEY: &str = "logo-example.png";

/// 各操作的模拟延迟
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub create: Duration,
    pub get: Duration,
    pub list: Duration,
    pub increment: Duration,
    pub upload: Duration,
    pub image_url: Duration,
}

impl LatencyProfile {
    /// 接近真实网络的延迟
    pub fn realistic() -> Self {
        Self {
            create: Duration::from_millis(300),
            get: Duration::from_millis(200),
            list: Duration::from_millis(300),
            increment: Duration::from_millis(100),
            upload: Duration::from_millis(500),
            image_url: Duration::from_millis(200),
        }
    }

    /// 无延迟（测试用）
    pub fn none() -> Self {
        Self {
            create: Duration::ZERO,
            get: Duration::ZERO,
            list: Duration::ZERO,
            increment: Duration::ZERO,
            upload: Duration::ZERO,
            image_url: Duration::ZERO,
        }
    }
}

/// 已存储的图片（内容不保留，只记录大小）
#[derive(Debug, Clone)]
struct StoredImage {
    size: usize,
    url: String,
}

/// 内存后端
pub struct MockBackend {
    coupons: MemoryStore<CouponRecord>,
    images: MemoryStore<StoredImage>,
    latency: LatencyProfile,
}

impl MockBackend {
    /// 创建空的内存后端
    pub fn new(latency: LatencyProfile) -> Self {
        Self {
            coupons: MemoryStore::new(),
            images: MemoryStore::new(),
            latency,
        }
    }

    /// 创建预置示例数据的内存后端
    pub fn seeded(latency: LatencyProfile) -> Self {
        let backend = Self::new(latency);
        backend.coupons.insert(SAMPLE_COUPON_ID, Self::sample_record());
        backend.images.insert(
            SAMPLE_IMAGE_KEY,
            StoredImage {
                size: 0,
                url: SAMPLE_LOGO_URL.to_string(),
            },
        );
        backend
    }

    /// 根据配置创建
    pub fn from_config(config: &MockProviderConfig) -> Self {
        let latency = if config.simulate_latency {
            LatencyProfile::realistic()
        } else {
            LatencyProfile::none()
        };

        if config.seed_sample {
            Self::seeded(latency)
        } else {
            Self::new(latency)
        }
    }

    /// 示例优惠券记录
    pub fn sample_record() -> CouponRecord {
        CouponRecord {
            id: SAMPLE_COUPON_ID.to_string(),
            title: "Cupón de ejemplo".to_string(),
            business_name: "Empresa Demo".to_string(),
            logo_url: Some(SAMPLE_LOGO_URL.to_string()),
            description: "Este es un cupón de ejemplo para desarrollo.".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: "25".to_string(),
            primary_color: "#4caf50".to_string(),
            secondary_color: "#e8f5e9".to_string(),
            text_color: "#1a1a1a".to_string(),
            valid_from: "2025-01-01T00:00:00Z".to_string(),
            valid_until: "2025-12-31T00:00:00Z".to_string(),
            terms_and_conditions: Some(
                "Solo un cupón por persona. No acumulable con otras promociones.".to_string(),
            ),
            redirect_url: Some("https://example.com".to_string()),
            redirect_type: RedirectType::Web,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
            scan_count: 5,
        }
    }

    async fn simulate(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CouponBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    #[instrument(skip(self, draft))]
    async fn create(&self, draft: CouponDraft) -> Result<CouponRecord> {
        self.simulate(self.latency.create).await;

        let coupon = Coupon::from_draft(Uuid::new_v4().to_string(), draft, Utc::now());
        let record = coupon.to_record();

        if !self.coupons.insert_if_absent(&record.id, record.clone()) {
            return Err(CouponError::Creation(format!("id duplicado: {}", record.id)));
        }

        info!(coupon_id = %record.id, "优惠券创建成功");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> Result<CouponRecord> {
        self.simulate(self.latency.get).await;

        self.coupons
            .get(id)
            .ok_or_else(|| CouponError::CouponNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<CouponRecord>> {
        self.simulate(self.latency.list).await;

        let coupons = self.coupons.list();
        debug!(count = coupons.len(), "列出优惠券");
        Ok(coupons)
    }

    #[instrument(skip(self))]
    async fn increment_scan_count(&self, id: &str) -> Result<bool> {
        self.simulate(self.latency.increment).await;

        // 持有该 id 的写锁完成读改写；updatedAt 保持不变
        let updated = self
            .coupons
            .update(id, |record| record.scan_count += 1)
            .ok_or_else(|| CouponError::CouponNotFound(id.to_string()))?;

        debug!(coupon_id = %id, scan_count = updated.scan_count, "扫码计数已更新");
        Ok(true)
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload_image(&self, bytes: &[u8], path: &str) -> Result<String> {
        self.simulate(self.latency.upload).await;

        if path.trim().is_empty() {
            return Err(CouponError::Validation(
                "la ruta de la imagen no puede estar vacía".to_string(),
            ));
        }

        let image = StoredImage {
            size: bytes.len(),
            url: PLACEHOLDER_IMAGE_URL.to_string(),
        };
        info!(key = %path, size = image.size, "图片上传成功");
        self.images.insert(path, image);

        Ok(path.to_string())
    }

    #[instrument(skip(self))]
    async fn get_image_url(&self, key: &str) -> Result<String> {
        self.simulate(self.latency.image_url).await;

        self.images
            .get(key)
            .map(|image| image.url)
            .ok_or_else(|| CouponError::ImageNotFound(key.to_string()))
    }
}
