//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `serve` - 启动远程优惠券 API
//! - `create` / `get` / `list` / `scan` / `redeem` - 优惠券操作
//! - `upload` / `image-url` - 图片存储
//! - `stats` / `export-csv` - 扫码事件统计与导出
//!
//! # 使用示例
//!
//! ```bash
//! # 启动远程 API 并写入示例优惠券
//! coupon-cli serve --port 8080 --seed
//!
//! # 通过远程 API 创建优惠券
//! coupon-cli --provider rest create -t "Promo verano" -b "Heladería Polar" -v 15
//!
//! # 统计最近 30 天的扫码
//! coupon-cli stats -e scans.json -d 30
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands, CreateArgs, DiscountArg};
pub use runner::CommandRunner;
