//! 扫码事件模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 设备分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceType {
    Mobile,
    Desktop,
    Tablet,
    Other,
}

impl DeviceType {
    pub const ALL: [DeviceType; 4] = [Self::Mobile, Self::Desktop, Self::Tablet, Self::Other];

    /// 根据设备标签分类，缺失或无法识别的标签归为 Other
    pub fn classify(tag: Option<&str>) -> Self {
        match tag {
            Some("mobile") => Self::Mobile,
            Some("desktop") => Self::Desktop,
            Some("tablet") => Self::Tablet,
            _ => Self::Other,
        }
    }

    /// 图表标签
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mobile => "Móvil",
            Self::Desktop => "Escritorio",
            Self::Tablet => "Tablet",
            Self::Other => "Otro",
        }
    }
}

/// 设备信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
}

/// 扫码事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub coupon_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub device: Option<DeviceInfo>,
}

impl ScanEvent {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            coupon_id: None,
            timestamp,
            device: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = Some(device);
        self
    }

    /// 事件的设备分类
    pub fn device_type(&self) -> DeviceType {
        DeviceType::classify(self.device.as_ref().and_then(|d| d.kind.as_deref()))
    }
}
