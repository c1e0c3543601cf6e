//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。
//! 优惠券相关子命令都经由门面执行，统计类子命令读取本地事件文件。

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{CouponError, Result};
use crate::models::{CouponDraft, DiscountType, RedirectType};

/// 优惠券命令行工具
///
/// 使用 `--help` 查看各子命令的详细说明。
#[derive(Parser, Debug)]
#[command(name = "coupon-cli")]
#[command(version, about = "二维码优惠券管理工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 后端名称 (mock, rest, firebase)，覆盖配置文件
    #[arg(short, long)]
    pub provider: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 折扣类型参数
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountArg {
    Percentage,
    Fixed,
    BuyOneGetOne,
    FreeItem,
}

impl From<DiscountArg> for DiscountType {
    fn from(arg: DiscountArg) -> Self {
        match arg {
            DiscountArg::Percentage => Self::Percentage,
            DiscountArg::Fixed => Self::Fixed,
            DiscountArg::BuyOneGetOne => Self::BuyOneGetOne,
            DiscountArg::FreeItem => Self::FreeItem,
        }
    }
}

/// 创建优惠券参数
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// 标题
    #[arg(short, long)]
    pub title: String,

    /// 商家名称
    #[arg(short, long)]
    pub business: String,

    /// 折扣值
    #[arg(short = 'v', long)]
    pub value: String,

    /// 折扣类型
    #[arg(short = 'k', long, value_enum, default_value = "percentage")]
    pub discount_type: DiscountArg,

    /// 描述
    #[arg(short, long)]
    pub description: Option<String>,

    /// 有效天数（从现在开始，默认 30 天）
    #[arg(long)]
    pub days: Option<i64>,

    /// Logo 图片地址
    #[arg(long)]
    pub logo_url: Option<String>,

    /// 跳转链接
    #[arg(long)]
    pub redirect_url: Option<String>,

    /// 跳转到 WhatsApp 而不是网页
    #[arg(long, requires = "redirect_url")]
    pub whatsapp: bool,
}

impl CreateArgs {
    /// 转换为优惠券输入
    ///
    /// 有效天数超出可表示的日期范围时返回校验错误
    pub fn into_draft(self, now: DateTime<Utc>) -> Result<CouponDraft> {
        let mut draft = CouponDraft::new(self.title, self.business, self.value)
            .with_discount_type(self.discount_type.into());

        if let Some(days) = self.days {
            let until = Duration::try_days(days)
                .and_then(|delta| now.checked_add_signed(delta))
                .ok_or_else(|| {
                    CouponError::Validation(format!("días de validez fuera de rango: {}", days))
                })?;
            draft = draft.with_validity(now, until);
        }
        if let Some(description) = self.description {
            draft = draft.with_description(description);
        }
        if let Some(logo_url) = self.logo_url {
            draft = draft.with_logo_url(logo_url);
        }
        if let Some(url) = self.redirect_url {
            let redirect_type = if self.whatsapp {
                RedirectType::Whatsapp
            } else {
                RedirectType::Web
            };
            draft = draft.with_redirect(url, redirect_type);
        }
        Ok(draft)
    }
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动远程优惠券 API（HTTP REST）
    Serve {
        /// 服务端口，覆盖配置文件
        #[arg(long)]
        port: Option<u16>,

        /// 启动时写入示例优惠券
        #[arg(long)]
        seed: bool,
    },

    /// 创建优惠券
    Create(CreateArgs),

    /// 查看优惠券详情
    Get {
        /// 优惠券 ID
        id: String,
    },

    /// 列出全部优惠券
    List,

    /// 扫码计数加一
    Scan {
        /// 优惠券 ID
        id: String,
    },

    /// 兑换：读取优惠券并登记一次扫码
    Redeem {
        /// 优惠券 ID
        id: String,
    },

    /// 上传图片
    Upload {
        /// 本地文件路径
        file: PathBuf,

        /// 存储路径（默认使用文件名）
        #[arg(long)]
        key: Option<String>,
    },

    /// 查看图片访问 URL
    ImageUrl {
        /// 存储 key
        key: String,
    },

    /// 统计扫码事件（按天与按设备）
    Stats {
        /// 扫码事件文件（JSON 数组）
        #[arg(short, long)]
        events: PathBuf,

        /// 统计天数
        #[arg(short, long, default_value = "7")]
        days: u32,
    },

    /// 导出扫码事件为 CSV
    ExportCsv {
        /// 扫码事件文件（JSON 数组）
        #[arg(short, long)]
        events: PathBuf,

        /// 输出文件（默认输出到标准输出）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::parse_from(["coupon-cli", "serve"]);
        assert!(matches!(
            cli.command,
            Commands::Serve {
                port: None,
                seed: false
            }
        ));
        assert!(cli.provider.is_none());
    }

    #[test]
    fn test_cli_parse_create() {
        let cli = Cli::parse_from([
            "coupon-cli",
            "--provider",
            "rest",
            "create",
            "-t",
            "Promo verano",
            "-b",
            "Heladería Polar",
            "-v",
            "15",
            "-k",
            "fixed",
            "--days",
            "10",
        ]);

        assert_eq!(cli.provider.as_deref(), Some("rest"));
        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.title, "Promo verano");
                assert_eq!(args.business, "Heladería Polar");
                assert_eq!(args.value, "15");
                assert_eq!(args.discount_type, DiscountArg::Fixed);
                assert_eq!(args.days, Some(10));
                assert!(!args.whatsapp);
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_whatsapp_requires_redirect_url() {
        let result = Cli::try_parse_from([
            "coupon-cli", "create", "-t", "a", "-b", "b", "-v", "1", "--whatsapp",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_stats() {
        let cli = Cli::parse_from(["coupon-cli", "stats", "--events", "scans.json"]);
        match cli.command {
            Commands::Stats { events, days } => {
                assert_eq!(events, PathBuf::from("scans.json"));
                assert_eq!(days, 7);
            }
            _ => panic!("Expected Stats command"),
        }
    }

    #[test]
    fn test_cli_parse_export_csv() {
        let cli = Cli::parse_from([
            "coupon-cli",
            "export-csv",
            "-e",
            "scans.json",
            "-o",
            "scans.csv",
        ]);
        assert!(matches!(
            cli.command,
            Commands::ExportCsv { output: Some(_), .. }
        ));
    }

    #[test]
    fn test_create_args_into_draft() {
        let cli = Cli::parse_from([
            "coupon-cli",
            "create",
            "-t",
            "2x1 en pizzas",
            "-b",
            "Pizzería Roma",
            "-v",
            "2x1",
            "-k",
            "buy-one-get-one",
            "--days",
            "7",
            "--redirect-url",
            "https://wa.me/5491100000000",
            "--whatsapp",
        ]);
        let Commands::Create(args) = cli.command else {
            panic!("Expected Create command");
        };

        let now = Utc::now();
        let draft = args.into_draft(now).unwrap();

        assert_eq!(draft.discount_type, Some(DiscountType::BuyOneGetOne));
        assert_eq!(draft.valid_from, Some(now));
        assert_eq!(draft.valid_until, Some(now + Duration::days(7)));
        assert_eq!(draft.redirect_type, Some(RedirectType::Whatsapp));
        assert!(draft.check(now).is_ok());
    }

    #[test]
    fn test_create_args_days_out_of_range() {
        for days in ["100000000", "9223372036854775807"] {
            let cli = Cli::parse_from([
                "coupon-cli", "create", "-t", "Promo", "-b", "Tienda", "-v", "5", "--days", days,
            ]);
            let Commands::Create(args) = cli.command else {
                panic!("Expected Create command");
            };

            let err = args.into_draft(Utc::now()).unwrap_err();
            assert!(matches!(err, CouponError::Validation(_)), "{days}: {err}");
        }
    }

    #[test]
    fn test_discount_arg_conversion() {
        assert_eq!(
            DiscountType::from(DiscountArg::BuyOneGetOne),
            DiscountType::BuyOneGetOne
        );
    }
}
