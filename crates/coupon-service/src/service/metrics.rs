//! 扫码事件统计
//!
//! 纯函数，不访问后端。日期按本地时区归档；
//! 每个函数都有一个接收 `now`/时区参数的版本，便于固定时间测试。

use chrono::{DateTime, Days, Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::models::{DeviceType, ScanEvent};

/// 无事件时 CSV 导出的内容
pub const EMPTY_EXPORT: &str = "No hay datos para exportar";

const CSV_HEADER: &str = "ID,Fecha,Hora,Dispositivo,Navegador,Sistema Operativo";
const MISSING: &str = "N/A";
const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

/// 按天统计的扫码序列
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSeries {
    /// `dd/MM/yyyy` 日期标签，从旧到新
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

/// 单个设备类别的占比
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceShare {
    pub device: DeviceType,
    pub label: &'static str,
    pub count: u64,
    /// 0.0 ~ 1.0，无事件时为 0
    pub ratio: f64,
}

/// 设备统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStats {
    pub total: u64,
    /// 按 Móvil、Escritorio、Tablet、Otro 的固定顺序
    pub breakdown: Vec<DeviceShare>,
}

impl DeviceStats {
    pub fn count(&self, device: DeviceType) -> u64 {
        self.breakdown
            .iter()
            .find(|share| share.device == device)
            .map_or(0, |share| share.count)
    }
}

/// 最近 `days` 天（含今天）每天的扫码次数
pub fn scans_over_time(events: &[ScanEvent], days: u32) -> ScanSeries {
    scans_over_time_at(events, days, Local::now())
}

/// 以 `now` 所在时区的日期为今天，统计最近 `days` 天的扫码次数
///
/// 窗口外的事件被忽略；`days` 为 0 时返回空序列
pub fn scans_over_time_at<Tz: TimeZone>(
    events: &[ScanEvent],
    days: u32,
    now: DateTime<Tz>,
) -> ScanSeries {
    let tz = now.timezone();
    let today = now.date_naive();
    let Some(start) = days
        .checked_sub(1)
        .and_then(|back| today.checked_sub_days(Days::new(u64::from(back))))
    else {
        return ScanSeries {
            labels: Vec::new(),
            counts: Vec::new(),
        };
    };

    let dates: Vec<NaiveDate> = start.iter_days().take(days as usize).collect();
    let mut counts = vec![0u64; dates.len()];

    for event in events {
        let day = event.timestamp.with_timezone(&tz).date_naive();
        if day < start || day > today {
            continue;
        }
        // 窗口内日期连续，偏移量即下标
        let index = (day - start).num_days() as usize;
        counts[index] += 1;
    }

    ScanSeries {
        labels: dates
            .iter()
            .map(|date| date.format(DATE_FORMAT).to_string())
            .collect(),
        counts,
    }
}

/// 按设备类别统计扫码次数
pub fn device_stats(events: &[ScanEvent]) -> DeviceStats {
    let mut counts = [0u64; DeviceType::ALL.len()];
    for event in events {
        let device = event.device_type();
        if let Some(index) = DeviceType::ALL.iter().position(|d| *d == device) {
            counts[index] += 1;
        }
    }

    let total: u64 = counts.iter().sum();
    let breakdown = DeviceType::ALL
        .iter()
        .zip(counts)
        .map(|(device, count)| DeviceShare {
            device: *device,
            label: device.label(),
            count,
            ratio: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();

    DeviceStats { total, breakdown }
}

/// 导出为 CSV（本地时区）
pub fn export_to_csv(events: &[ScanEvent]) -> String {
    export_to_csv_in(events, &Local)
}

/// 导出为 CSV，日期与时间按指定时区格式化
///
/// 无事件时返回 [`EMPTY_EXPORT`]
pub fn export_to_csv_in<Tz: TimeZone>(events: &[ScanEvent], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if events.is_empty() {
        return EMPTY_EXPORT.to_string();
    }

    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for event in events {
        let local = event.timestamp.with_timezone(tz);
        let device = event.device.as_ref();
        let fields = [
            or_missing(event.id.as_deref()),
            local.format(DATE_FORMAT).to_string(),
            local.format(TIME_FORMAT).to_string(),
            or_missing(device.and_then(|d| d.kind.as_deref())),
            or_missing(device.and_then(|d| d.browser.as_deref())),
            or_missing(device.and_then(|d| d.os.as_deref())),
        ];
        lines.push(
            fields
                .iter()
                .map(|field| csv_field(field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}

/// 缺失或为空的字段输出 `N/A`
fn or_missing(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING)
        .to_string()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
