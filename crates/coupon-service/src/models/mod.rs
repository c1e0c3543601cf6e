//! 数据模型
//!
//! 优惠券实体、结果信封与扫码事件。

pub mod coupon;
pub mod envelope;
pub mod scan;

pub use coupon::{Coupon, CouponDraft, CouponRecord, DiscountType, RedirectType};
pub use envelope::ServiceResult;
pub use scan::{DeviceInfo, DeviceType, ScanEvent};
