//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑。
//! 优惠券操作全部经由门面完成，结果以 JSON 输出到标准输出。

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use coupon_shared::AppConfig;

use super::commands::{Commands, CreateArgs};
use crate::api::{RemoteApiState, remote_api_app};
use crate::models::{ScanEvent, ServiceResult};
use crate::provider::{MockBackend, ServiceProvider};
use crate::service::{CouponService, ShareLinks, device_stats, export_to_csv, scans_over_time};

/// 命令执行器
///
/// 持有配置、门面与分享链接生成器，作为 CLI 与业务逻辑之间的桥梁。
pub struct CommandRunner {
    config: AppConfig,
    service: CouponService,
    links: ShareLinks,
}

impl CommandRunner {
    /// 按配置选择后端并创建执行器
    ///
    /// 后端名称无法识别时直接返回错误
    pub fn new(config: AppConfig) -> Result<Self> {
        let provider =
            ServiceProvider::from_config(&config.provider).context("初始化优惠券后端失败")?;
        let links = ShareLinks::new(&config.share.base_url);

        Ok(Self {
            service: CouponService::new(provider),
            links,
            config,
        })
    }

    pub fn service(&self) -> &CouponService {
        &self.service
    }

    /// 执行子命令
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Serve { port, seed } => self.run_serve(port, seed).await,
            Commands::Create(args) => self.run_create(args).await,
            Commands::Get { id } => {
                let coupon = unwrap_result(self.service.get_coupon_by_id(&id).await)?;
                print_json(&coupon)
            }
            Commands::List => {
                let coupons = unwrap_result(self.service.list_coupons().await)?;
                print_json(&coupons)
            }
            Commands::Scan { id } => {
                unwrap_result(self.service.increment_scan_count(&id).await)?;
                println!("Escaneo registrado para el cupón {}", id);
                Ok(())
            }
            Commands::Redeem { id } => {
                let redemption = unwrap_result(self.service.redeem_coupon(&id).await)?;
                print_json(&redemption)
            }
            Commands::Upload { file, key } => self.run_upload(&file, key).await,
            Commands::ImageUrl { key } => {
                let url = unwrap_result(self.service.get_image_url(&key).await)?;
                println!("{}", url);
                Ok(())
            }
            Commands::Stats { events, days } => {
                let events = load_events(&events)?;
                print_json(&json!({
                    "scansOverTime": scans_over_time(&events, days),
                    "devices": device_stats(&events),
                }))
            }
            Commands::ExportCsv { events, output } => {
                let csv = export_to_csv(&load_events(&events)?);
                match output {
                    Some(path) => {
                        fs::write(&path, csv)
                            .with_context(|| format!("写入文件失败: {}", path.display()))?;
                        info!(path = %path.display(), "CSV 导出完成");
                    }
                    None => println!("{}", csv),
                }
                Ok(())
            }
        }
    }

    /// 执行 serve 命令
    ///
    /// 启动远程优惠券 API，直到收到 Ctrl+C
    pub async fn run_serve(&self, port: Option<u16>, seed: bool) -> Result<()> {
        let state = self.serve_state(seed);
        let addr = self.config.server_addr(port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("绑定地址失败: {}", addr))?;

        info!("远程优惠券 API 已启动: http://{}", addr);
        info!("按 Ctrl+C 停止服务");

        axum::serve(listener, remote_api_app(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("服务器运行失败")?;

        info!("远程优惠券 API 已停止");
        Ok(())
    }

    /// 构建远程 API 状态，`seed` 时写入示例优惠券
    fn serve_state(&self, seed: bool) -> Arc<RemoteApiState> {
        let state = Arc::new(RemoteApiState::new(&self.config.server.public_base_url));
        if seed {
            let sample = MockBackend::sample_record();
            let id = sample.id.clone();
            state.coupons.insert(&id, sample);
            info!(coupon_id = %id, "已写入示例优惠券");
        }
        state
    }

    /// 执行 create 命令，输出优惠券及其分享信息
    pub async fn run_create(&self, args: CreateArgs) -> Result<()> {
        let now = Utc::now();
        let coupon = unwrap_result(self.service.create_coupon(args.into_draft(now)?).await)?;

        print_json(&json!({
            "coupon": coupon,
            "redeemUrl": self.links.redeem_url(&coupon.id),
            "qrFilename": format!("{}.png", self.links.qr_filename(&coupon.title, now.timestamp_millis())),
        }))
    }

    /// 执行 upload 命令
    pub async fn run_upload(&self, file: &Path, key: Option<String>) -> Result<()> {
        let bytes =
            fs::read(file).with_context(|| format!("读取文件失败: {}", file.display()))?;
        let key = match key {
            Some(key) => key,
            None => file
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
                .ok_or_else(|| anyhow!("无法从路径推断存储 key: {}", file.display()))?,
        };

        let stored = unwrap_result(self.service.upload_image(&bytes, &key).await)?;
        println!("{}", stored);
        Ok(())
    }
}

/// 从 JSON 文件读取扫码事件
pub fn load_events(path: &Path) -> Result<Vec<ScanEvent>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("读取文件失败: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("解析扫码事件失败: {}", path.display()))
}

fn unwrap_result<T>(result: ServiceResult<T>) -> Result<T> {
    result.into_result().map_err(|message| anyhow!(message))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 等待关闭信号
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "安装 CTRL+C 信号处理器失败");
        std::future::pending::<()>().await;
    }
    info!("收到关闭信号，正在停止服务...");
}

// ============================================================================
// 单元测试
// ============================================================================
