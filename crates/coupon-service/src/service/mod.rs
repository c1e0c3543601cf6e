//! 业务服务层
//!
//! - `coupon_service`: 优惠券门面，所有调用方的唯一入口
//! - `metrics`: 扫码事件统计与 CSV 导出
//! - `share`: 兑换链接与二维码文件名

pub mod coupon_service;
pub mod metrics;
pub mod share;

pub use coupon_service::{CouponService, Redemption};
pub use metrics::{DeviceShare, DeviceStats, ScanSeries, device_stats, export_to_csv, scans_over_time};
pub use share::ShareLinks;
