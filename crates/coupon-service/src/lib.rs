//! Coupon Service
//!
//! 二维码优惠券的核心库：优惠券实体、可替换的持久化后端、
//! 统一结果信封的门面层，以及扫码事件统计。
//!
//! # 主要模块
//!
//! - `models`: 优惠券实体、持久化记录、结果信封、扫码事件
//! - `provider`: 后端接口与 Mock / Rest / Firebase 实现，以及后端选择器
//! - `service`: 优惠券门面、统计、分享链接
//! - `api`: 远程优惠券 REST API（Rest 后端的服务端）
//! - `store`: 内存存储实现
//! - `cli`: 命令行入口
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use coupon_service::models::CouponDraft;
//! use coupon_service::provider::ServiceProvider;
//! use coupon_service::service::CouponService;
//! use coupon_shared::AppConfig;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = AppConfig::load("coupon-service")?;
//! let service = CouponService::new(ServiceProvider::from_config(&config.provider)?);
//!
//! let created = service
//!     .create_coupon(CouponDraft::new("Promo verano", "Heladería Polar", "15"))
//!     .await;
//! if let Some(coupon) = created.data {
//!     service.increment_scan_count(&coupon.id).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod error;
pub mod models;
pub mod provider;
pub mod service;
pub mod store;

pub use error::{CouponError, Result};
