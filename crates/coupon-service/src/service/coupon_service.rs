//! 优惠券门面
//!
//! 调用方只与 [`CouponService`] 交互。每个操作转发给选定的后端，
//! 把原始记录转换为 `Coupon`，并统一包装为 [`ServiceResult`]：
//!
//! - 后端返回的错误信息原样透传
//! - 后端调用中的 panic 被捕获，使用 panic 信息或操作对应的默认信息
//! - 门面层自身不会 panic，也不会向调用方抛出错误

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::error::Result;
use crate::models::{Coupon, CouponDraft, ServiceResult};
use crate::provider::ServiceProvider;

/// 兑换结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub coupon: Coupon,
    /// 当前是否处于有效期内
    pub valid: bool,
    pub days_remaining: i64,
    /// 本次扫码是否已计入
    pub scan_registered: bool,
}

/// 优惠券门面
#[derive(Debug, Clone)]
pub struct CouponService {
    provider: ServiceProvider,
}

impl CouponService {
    pub fn new(provider: ServiceProvider) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// 创建优惠券
    ///
    /// 输入先经过校验，不合法时直接返回失败，不会到达后端
    #[instrument(skip(self, draft))]
    pub async fn create_coupon(&self, draft: CouponDraft) -> ServiceResult<Coupon> {
        if let Err(err) = draft.check(Utc::now()) {
            warn!(error = %err, "优惠券输入校验失败");
            return ServiceResult::fail(err.to_string());
        }

        let backend = self.provider.backend();
        let outcome = guarded(async move { backend.create(draft).await }, || {
            "Error al crear cupón".to_string()
        })
        .await;

        match outcome.and_then(decode) {
            Ok(coupon) => {
                info!(coupon_id = %coupon.id, "优惠券已创建");
                ServiceResult::ok(coupon)
            }
            Err(message) => ServiceResult::fail(message),
        }
    }

    /// 按 id 获取优惠券
    #[instrument(skip(self))]
    pub async fn get_coupon_by_id(&self, id: &str) -> ServiceResult<Coupon> {
        let backend = self.provider.backend();
        let outcome = guarded(async move { backend.get_by_id(id).await }, || {
            format!("Error al obtener cupón {}", id)
        })
        .await;

        match outcome.and_then(decode) {
            Ok(coupon) => ServiceResult::ok(coupon),
            Err(message) => ServiceResult::fail(message),
        }
    }

    /// 列出全部优惠券
    ///
    /// 任意一条记录无法解析时整体失败，data 为空列表
    #[instrument(skip(self))]
    pub async fn list_coupons(&self) -> ServiceResult<Vec<Coupon>> {
        let backend = self.provider.backend();
        let outcome = guarded(async move { backend.list().await }, || {
            "Error al listar cupones".to_string()
        })
        .await;

        let decoded = outcome.and_then(|records| {
            records
                .into_iter()
                .map(decode)
                .collect::<std::result::Result<Vec<_>, _>>()
        });
        match decoded {
            Ok(coupons) => ServiceResult::ok(coupons),
            Err(message) => ServiceResult::fail_with(Vec::new(), message),
        }
    }

    /// 扫码计数加一
    #[instrument(skip(self))]
    pub async fn increment_scan_count(&self, id: &str) -> ServiceResult<bool> {
        let backend = self.provider.backend();
        let outcome = guarded(async move { backend.increment_scan_count(id).await }, || {
            format!("Error al incrementar contador para cupón {}", id)
        })
        .await;

        match outcome {
            Ok(incremented) => ServiceResult::ok(incremented),
            Err(message) => ServiceResult::fail_with(false, message),
        }
    }

    /// 上传图片，返回存储 key
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(&self, bytes: &[u8], path: &str) -> ServiceResult<String> {
        let backend = self.provider.backend();
        let outcome = guarded(async move { backend.upload_image(bytes, path).await }, || {
            "Error al subir imagen".to_string()
        })
        .await;

        match outcome {
            Ok(key) => ServiceResult::ok(key),
            Err(message) => ServiceResult::fail(message),
        }
    }

    /// 获取图片访问 URL
    #[instrument(skip(self))]
    pub async fn get_image_url(&self, key: &str) -> ServiceResult<String> {
        let backend = self.provider.backend();
        let outcome = guarded(async move { backend.get_image_url(key).await }, || {
            format!("Error al obtener URL de la imagen {}", key)
        })
        .await;

        match outcome {
            Ok(url) => ServiceResult::ok(url),
            Err(message) => ServiceResult::fail(message),
        }
    }

    /// 兑换页面流程：读取优惠券、登记一次扫码、报告当前有效性
    ///
    /// 计数失败不影响兑换结果，只反映在 `scan_registered` 上
    #[instrument(skip(self))]
    pub async fn redeem_coupon(&self, id: &str) -> ServiceResult<Redemption> {
        let mut coupon = match self.get_coupon_by_id(id).await.into_result() {
            Ok(coupon) => coupon,
            Err(message) => return ServiceResult::fail(message),
        };

        let scan = self.increment_scan_count(id).await;
        let scan_registered = scan.success && scan.data == Some(true);
        if scan_registered {
            coupon.scan_count += 1;
        } else {
            warn!(coupon_id = %id, error = ?scan.error, "扫码计数失败");
        }

        let now = Utc::now();
        ServiceResult::ok(Redemption {
            valid: coupon.is_valid_at(now),
            days_remaining: coupon.days_remaining_at(now),
            coupon,
            scan_registered,
        })
    }
}

/// 执行后端调用，错误与 panic 都转换为错误信息
async fn guarded<T, F>(call: F, fallback: impl FnOnce() -> String) -> std::result::Result<T, String>
where
    F: Future<Output = Result<T>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            warn!(code = err.error_code(), error = %err, "后端操作失败");
            let message = err.to_string();
            Err(if message.is_empty() { fallback() } else { message })
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref()).unwrap_or_else(fallback);
            error!(error = %message, "后端调用发生 panic");
            Err(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .filter(|message| !message.is_empty())
}

fn decode(record: crate::models::CouponRecord) -> std::result::Result<Coupon, String> {
    Coupon::from_record(record).map_err(|err| {
        error!(error = %err, "优惠券记录解析失败");
        err.to_string()
    })
}
