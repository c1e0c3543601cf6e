//! 后端提供者
//!
//! 所有后端实现同一套能力：四个优惠券操作与两个存储操作。
//! 调用方只通过 [`ServiceProvider`] 获得后端，不直接构造具体实现。
//!
//! ## 可选后端
//!
//! - **Mock**: 内存实现，模拟网络延迟，预置一张示例优惠券
//! - **Rest**: 通过 HTTP 调用远程优惠券 API
//! - **Firebase**: 预留实现，所有操作返回"未实现"错误

mod firebase;
mod mock;
mod rest;
mod selector;

pub use firebase::FirebaseBackend;
pub use mock::{LatencyProfile, MockBackend, PLACEHOLDER_IMAGE_URL, SAMPLE_COUPON_ID};
pub use rest::RestBackend;
pub use selector::ServiceProvider;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::{CouponError, Result};
use crate::models::{CouponDraft, CouponRecord};

/// 后端能力接口
///
/// 返回的是原始持久化记录，由门面层负责转换为 `Coupon` 实体。
/// 失败一律通过 `Err` 返回，实现不应 panic。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponBackend: Send + Sync {
    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;

    /// 创建优惠券
    ///
    /// 分配新 id，`createdAt = updatedAt = now`，`scanCount = 0`，持久化后返回完整记录
    async fn create(&self, draft: CouponDraft) -> Result<CouponRecord>;

    /// 按 id 查询，不存在时返回 `CouponNotFound`
    async fn get_by_id(&self, id: &str) -> Result<CouponRecord>;

    /// 列出全部优惠券，顺序不保证
    async fn list(&self) -> Result<Vec<CouponRecord>>;

    /// 扫码计数原子加一，不存在时返回 `CouponNotFound`
    async fn increment_scan_count(&self, id: &str) -> Result<bool>;

    /// 上传图片，返回存储 key
    async fn upload_image(&self, bytes: &[u8], path: &str) -> Result<String>;

    /// 获取图片访问 URL
    async fn get_image_url(&self, key: &str) -> Result<String>;
}

/// 后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Mock,
    Rest,
    Firebase,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Rest => "rest",
            Self::Firebase => "firebase",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = CouponError;

    /// 解析后端名称，大小写不敏感；`aws` 是 `rest` 的别名
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "rest" | "aws" => Ok(Self::Rest),
            "firebase" => Ok(Self::Firebase),
            _ => Err(CouponError::Config(format!("Provider {} not supported", s))),
        }
    }
}
