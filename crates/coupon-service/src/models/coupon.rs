//! 优惠券实体
//!
//! `Coupon` 是唯一持久化的实体。对外的持久化格式为 `CouponRecord`：
//! 扁平结构、camelCase 字段名、所有时间字段为 ISO-8601 字符串。
//! `Coupon` 的 serde 实现直接经由 `CouponRecord`，因此两者的 JSON 形态一致。

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{CouponError, Result};

pub const DEFAULT_PRIMARY_COLOR: &str = "#3182CE";
pub const DEFAULT_SECONDARY_COLOR: &str = "#EDF2F7";
pub const DEFAULT_TEXT_COLOR: &str = "#1A202C";

/// 未指定结束时间时的默认有效期（天）
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// 折扣类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountType {
    /// 百分比折扣（如 25%）
    #[default]
    Percentage,
    /// 固定金额
    Fixed,
    /// 买一送一
    BuyOneGetOne,
    /// 赠品
    FreeItem,
}

impl DiscountType {
    /// 折扣值是否必须为数字
    pub fn requires_numeric_value(&self) -> bool {
        matches!(self, Self::Percentage | Self::Fixed)
    }
}

/// 扫码后的跳转方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RedirectType {
    #[default]
    Web,
    Whatsapp,
}

/// 创建优惠券的输入
///
/// 显式列出所有可由调用方提供的字段，未知字段在反序列化时直接拒绝。
/// `id`、`createdAt`、`updatedAt`、`scanCount` 由后端分配，不在此列。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CouponDraft {
    #[validate(
        required(message = "title es obligatorio"),
        length(min = 1, message = "title no puede estar vacío")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "businessName es obligatorio"),
        length(min = 1, message = "businessName no puede estar vacío")
    )]
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(
        required(message = "discountValue es obligatorio"),
        length(min = 1, message = "discountValue no puede estar vacío")
    )]
    pub discount_value: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub text_color: Option<String>,
    pub logo_url: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub terms_and_conditions: Option<String>,
    pub redirect_url: Option<String>,
    pub redirect_type: Option<RedirectType>,
}

impl CouponDraft {
    /// 使用三个必填字段创建输入，其余字段保持未设置
    pub fn new(
        title: impl Into<String>,
        business_name: impl Into<String>,
        discount_value: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            business_name: Some(business_name.into()),
            discount_value: Some(discount_value.into()),
            ..Default::default()
        }
    }

    pub fn with_discount_type(mut self, discount_type: DiscountType) -> Self {
        self.discount_type = Some(discount_type);
        self
    }

    pub fn with_validity(mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.valid_from = Some(from);
        self.valid_until = Some(until);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_logo_url(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    pub fn with_redirect(mut self, url: impl Into<String>, redirect_type: RedirectType) -> Self {
        self.redirect_url = Some(url.into());
        self.redirect_type = Some(redirect_type);
        self
    }

    /// 创建前的业务校验
    ///
    /// - title、businessName、discountValue 必填且去除空白后非空
    /// - 百分比/固定金额类型的折扣值必须是非负数字，百分比不超过 100
    /// - 应用默认值后 validFrom 不晚于 validUntil
    pub fn check(&self, now: DateTime<Utc>) -> Result<()> {
        self.validate()?;

        for (field, value) in [
            ("title", &self.title),
            ("businessName", &self.business_name),
            ("discountValue", &self.discount_value),
        ] {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                return Err(CouponError::Validation(format!(
                    "{} no puede estar vacío",
                    field
                )));
            }
        }

        let discount_type = self.discount_type.unwrap_or_default();
        if discount_type.requires_numeric_value() {
            let raw = self.discount_value.as_deref().unwrap_or_default().trim();
            let value: f64 = raw.parse().map_err(|_| {
                CouponError::Validation(format!("discountValue debe ser numérico: {}", raw))
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(CouponError::Validation(format!(
                    "discountValue debe ser un número no negativo: {}",
                    raw
                )));
            }
            if discount_type == DiscountType::Percentage && value > 100.0 {
                return Err(CouponError::Validation(format!(
                    "el porcentaje no puede superar 100: {}",
                    raw
                )));
            }
        }

        let (valid_from, valid_until) = self.resolve_validity(now);
        if valid_from > valid_until {
            return Err(CouponError::Validation(
                "validFrom no puede ser posterior a validUntil".to_string(),
            ));
        }

        Ok(())
    }

    /// 应用默认有效期：开始时间默认为 now，结束时间默认为 now + 30 天
    fn resolve_validity(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.valid_from.unwrap_or(now),
            self.valid_until
                .unwrap_or(now + Duration::days(DEFAULT_VALIDITY_DAYS)),
        )
    }
}

/// 优惠券
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "CouponRecord", try_from = "CouponRecord")]
pub struct Coupon {
    pub id: String,
    pub title: String,
    pub business_name: String,
    pub logo_url: Option<String>,
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub text_color: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub terms_and_conditions: Option<String>,
    pub redirect_url: Option<String>,
    pub redirect_type: RedirectType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scan_count: u64,
}

impl Coupon {
    /// 由输入构造完整的优惠券
    ///
    /// 调用方提供的字段原样保留，缺省字段使用默认值；
    /// `created_at = updated_at = now`，`scan_count = 0`。
    pub fn from_draft(id: impl Into<String>, draft: CouponDraft, now: DateTime<Utc>) -> Self {
        let (valid_from, valid_until) = draft.resolve_validity(now);

        Self {
            id: id.into(),
            title: draft.title.unwrap_or_default(),
            business_name: draft.business_name.unwrap_or_default(),
            logo_url: draft.logo_url,
            description: draft.description.unwrap_or_default(),
            discount_type: draft.discount_type.unwrap_or_default(),
            discount_value: draft.discount_value.unwrap_or_default(),
            primary_color: draft
                .primary_color
                .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
            secondary_color: draft
                .secondary_color
                .unwrap_or_else(|| DEFAULT_SECONDARY_COLOR.to_string()),
            text_color: draft
                .text_color
                .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            valid_from,
            valid_until,
            terms_and_conditions: draft.terms_and_conditions,
            redirect_url: draft.redirect_url,
            redirect_type: draft.redirect_type.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            scan_count: 0,
        }
    }

    /// 判断在指定时刻是否处于有效期内（两端均包含）
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_from && now <= self.valid_until
    }

    /// 判断当前是否处于有效期内
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// 剩余天数（向上取整），不在有效期内时为 0
    pub fn days_remaining_at(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_valid_at(now) {
            return 0;
        }
        let millis = (self.valid_until - now).num_milliseconds();
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }

    /// 序列化为持久化格式
    pub fn to_record(&self) -> CouponRecord {
        CouponRecord::from(self.clone())
    }

    /// 从持久化格式还原
    pub fn from_record(record: CouponRecord) -> Result<Self> {
        Self::try_from(record)
    }
}

/// 优惠券持久化格式
///
/// 后端之间唯一的持久化契约。时间字段为 RFC 3339 / ISO-8601 字符串，
/// 亚秒精度按实际位数输出，保证与 `Coupon` 之间的往返转换无损。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRecord {
    pub id: String,
    pub title: String,
    pub business_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_type: DiscountType,
    pub discount_value: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub text_color: String,
    pub valid_from: String,
    pub valid_until: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_and_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub redirect_type: RedirectType,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub scan_count: u64,
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| CouponError::InvalidRecord(format!("{} '{}': {}", field, value, e)))
}

impl From<Coupon> for CouponRecord {
    fn from(coupon: Coupon) -> Self {
        Self {
            valid_from: format_timestamp(&coupon.valid_from),
            valid_until: format_timestamp(&coupon.valid_until),
            created_at: format_timestamp(&coupon.created_at),
            updated_at: format_timestamp(&coupon.updated_at),
            id: coupon.id,
            title: coupon.title,
            business_name: coupon.business_name,
            logo_url: coupon.logo_url,
            description: coupon.description,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            primary_color: coupon.primary_color,
            secondary_color: coupon.secondary_color,
            text_color: coupon.text_color,
            terms_and_conditions: coupon.terms_and_conditions,
            redirect_url: coupon.redirect_url,
            redirect_type: coupon.redirect_type,
            scan_count: coupon.scan_count,
        }
    }
}

impl TryFrom<CouponRecord> for Coupon {
    type Error = CouponError;

    fn try_from(record: CouponRecord) -> Result<Self> {
        Ok(Self {
            valid_from: parse_timestamp("validFrom", &record.valid_from)?,
            valid_until: parse_timestamp("validUntil", &record.valid_until)?,
            created_at: parse_timestamp("createdAt", &record.created_at)?,
            updated_at: parse_timestamp("updatedAt", &record.updated_at)?,
            id: record.id,
            title: record.title,
            business_name: record.business_name,
            logo_url: record.logo_url,
            description: record.description,
            discount_type: record.discount_type,
            discount_value: record.discount_value,
            primary_color: record.primary_color,
            secondary_color: record.secondary_color,
            text_color: record.text_color,
            terms_and_conditions: record.terms_and_conditions,
            redirect_url: record.redirect_url,
            redirect_type: record.redirect_type,
            scan_count: record.scan_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn test_coupon() -> Coupon {
        let now = fixed_now();
        let draft = CouponDraft::new("2x1 en cafés", "Café Central", "25")
            .with_validity(now - Duration::days(1), now + Duration::days(1));
        Coupon::from_draft("cpn-1", draft, now)
    }

    #[test]
    fn test_from_draft_applies_defaults() {
        let now = fixed_now();
        let coupon = Coupon::from_draft("cpn-1", CouponDraft::new("Promo", "Tienda", "10"), now);

        assert_eq!(coupon.discount_type, DiscountType::Percentage);
        assert_eq!(coupon.redirect_type, RedirectType::Web);
        assert_eq!(coupon.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(coupon.secondary_color, DEFAULT_SECONDARY_COLOR);
        assert_eq!(coupon.text_color, DEFAULT_TEXT_COLOR);
        assert_eq!(coupon.valid_from, now);
        assert_eq!(coupon.valid_until, now + Duration::days(30));
        assert_eq!(coupon.created_at, now);
        assert_eq!(coupon.updated_at, now);
        assert_eq!(coupon.scan_count, 0);
        assert!(coupon.logo_url.is_none());
    }

    #[test]
    fn test_from_draft_preserves_client_fields() {
        let now = fixed_now();
        let draft = CouponDraft {
            primary_color: Some("#000000".to_string()),
            terms_and_conditions: Some("Uno por persona".to_string()),
            ..CouponDraft::new("Promo", "Tienda", "Café gratis")
                .with_discount_type(DiscountType::FreeItem)
                .with_redirect("https://wa.me/5215555555555", RedirectType::Whatsapp)
        };

        let coupon = Coupon::from_draft("cpn-2", draft, now);

        assert_eq!(coupon.discount_type, DiscountType::FreeItem);
        assert_eq!(coupon.discount_value, "Café gratis");
        assert_eq!(coupon.primary_color, "#000000");
        assert_eq!(coupon.terms_and_conditions.as_deref(), Some("Uno por persona"));
        assert_eq!(coupon.redirect_type, RedirectType::Whatsapp);
    }

    #[test]
    fn test_is_valid_inclusive_bounds() {
        let coupon = test_coupon();

        assert!(coupon.is_valid_at(coupon.valid_from));
        assert!(coupon.is_valid_at(coupon.valid_until));
        assert!(coupon.is_valid_at(fixed_now()));
        assert!(!coupon.is_valid_at(coupon.valid_from - Duration::milliseconds(1)));
        assert!(!coupon.is_valid_at(coupon.valid_until + Duration::milliseconds(1)));
    }

    #[test]
    fn test_days_remaining() {
        let coupon = test_coupon();
        let now = fixed_now();

        assert_eq!(coupon.days_remaining_at(now), 1);
        assert_eq!(coupon.days_remaining_at(now - Duration::hours(1)), 2);
        assert_eq!(coupon.days_remaining_at(coupon.valid_until), 0);
        assert_eq!(coupon.days_remaining_at(now + Duration::days(5)), 0);
    }

    #[test]
    fn test_record_round_trip_is_identity() {
        let mut coupon = test_coupon();
        coupon.logo_url = Some("logos/cafe.png".to_string());
        coupon.scan_count = 42;
        // 保留亚秒精度
        coupon.updated_at = coupon.updated_at + Duration::nanoseconds(123_456_789);

        let record = coupon.to_record();
        let restored = Coupon::from_record(record).unwrap();

        assert_eq!(restored, coupon);
    }

    #[test]
    fn test_json_round_trip_uses_record_shape() {
        let coupon = test_coupon();

        let json = serde_json::to_value(&coupon).unwrap();
        assert_eq!(json["businessName"], "Café Central");
        assert_eq!(json["discountType"], "percentage");
        assert_eq!(json["validFrom"], "2025-06-14T12:00:00Z");
        assert_eq!(json["scanCount"], 0);

        let restored: Coupon = serde_json::from_value(json).unwrap();
        assert_eq!(restored, coupon);
    }

    #[test]
    fn test_record_accepts_javascript_iso_strings() {
        let record: CouponRecord = serde_json::from_value(serde_json::json!({
            "id": "1",
            "title": "Cupón de ejemplo",
            "businessName": "Empresa Demo",
            "discountType": "buyOneGetOne",
            "discountValue": "2x1",
            "primaryColor": "#4caf50",
            "secondaryColor": "#e8f5e9",
            "textColor": "#1a1a1a",
            "validFrom": "2025-01-01T00:00:00.000Z",
            "validUntil": "2025-12-31T00:00:00.000Z",
            "createdAt": "2025-01-01T00:00:00.000Z",
            "updatedAt": "2025-01-01T00:00:00.000Z",
            "scanCount": 5
        }))
        .unwrap();

        let coupon = Coupon::from_record(record).unwrap();
        assert_eq!(coupon.discount_type, DiscountType::BuyOneGetOne);
        assert_eq!(coupon.valid_from, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(coupon.scan_count, 5);
    }

    #[test]
    fn test_invalid_timestamp_is_reported() {
        let mut record = test_coupon().to_record();
        record.valid_until = "31/12/2025".to_string();

        let err = Coupon::from_record(record).unwrap_err();
        assert!(matches!(err, CouponError::InvalidRecord(_)));
        assert!(err.to_string().contains("validUntil"));
    }

    #[test]
    fn test_draft_rejects_unknown_fields() {
        let result: std::result::Result<CouponDraft, _> = serde_json::from_value(serde_json::json!({
            "title": "Promo",
            "businessName": "Tienda",
            "discountValue": "10",
            "scanCount": 1000
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_draft_check() {
        let now = fixed_now();

        assert!(CouponDraft::new("Promo", "Tienda", "10").check(now).is_ok());
        assert!(
            CouponDraft::new("Promo", "Tienda", "2x1")
                .with_discount_type(DiscountType::BuyOneGetOne)
                .check(now)
                .is_ok()
        );

        let missing_title = CouponDraft {
            title: None,
            ..CouponDraft::new("", "Tienda", "10")
        };
        let err = missing_title.check(now).unwrap_err();
        assert!(matches!(err, CouponError::Validation(_)));
        assert!(err.to_string().contains("title"));

        let blank_business = CouponDraft::new("Promo", "   ", "10");
        assert!(blank_business.check(now).is_err());

        let not_numeric = CouponDraft::new("Promo", "Tienda", "diez")
            .with_discount_type(DiscountType::Fixed);
        assert!(not_numeric.check(now).is_err());

        let over_hundred = CouponDraft::new("Promo", "Tienda", "150");
        assert!(over_hundred.check(now).is_err());

        let inverted = CouponDraft::new("Promo", "Tienda", "10")
            .with_validity(now + Duration::days(2), now);
        let err = inverted.check(now).unwrap_err();
        assert!(err.to_string().contains("validFrom"));
    }

    #[test]
    fn test_discount_type_wire_names() {
        let names: Vec<String> = [
            DiscountType::Percentage,
            DiscountType::Fixed,
            DiscountType::BuyOneGetOne,
            DiscountType::FreeItem,
        ]
        .iter()
        .map(|t| serde_json::to_value(t).unwrap().as_str().unwrap().to_string())
        .collect();

        assert_eq!(names, ["percentage", "fixed", "buyOneGetOne", "freeItem"]);
        assert_eq!(
            serde_json::to_value(RedirectType::Whatsapp).unwrap(),
            serde_json::json!("whatsapp")
        );
    }
}
