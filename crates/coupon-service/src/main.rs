//! Coupon CLI
//!
//! 优惠券命令行入口点：加载配置、初始化日志、选择后端并执行子命令。

use clap::Parser;
use coupon_service::cli::{Cli, CommandRunner};
use coupon_shared::{AppConfig, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load("coupon-service")?;
    if let Some(provider) = cli.provider {
        config.provider.kind = provider;
    }

    // 命令行参数覆盖配置文件中的级别，RUST_LOG 仍然优先
    let mut observability = config.observability.clone();
    if let Some(level) = cli.log_level {
        observability = observability.with_log_level(level);
    }
    init_logging(&observability)?;

    let runner = CommandRunner::new(config)?;
    runner.run(cli.command).await
}
