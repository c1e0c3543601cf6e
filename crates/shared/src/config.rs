//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// REST 后端配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RestProviderConfig {
    /// 远程优惠券 API 地址，例如 http://localhost:8080
    pub base_url: String,
    /// 单次请求超时（毫秒）
    pub timeout_ms: u64,
}

impl Default for RestProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 5000,
        }
    }
}

/// 内存后端配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockProviderConfig {
    /// 是否模拟网络延迟
    pub simulate_latency: bool,
    /// 是否预置示例优惠券
    pub seed_sample: bool,
}

impl Default for MockProviderConfig {
    fn default() -> Self {
        Self {
            simulate_latency: true,
            seed_sample: true,
        }
    }
}

/// 后端选择配置
///
/// `kind` 在进程启动时解析一次，未知名称视为致命配置错误
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// mock | rest | firebase
    pub kind: String,
    pub mock: MockProviderConfig,
    pub rest: RestProviderConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: "mock".to_string(),
            mock: MockProviderConfig::default(),
            rest: RestProviderConfig::default(),
        }
    }
}

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 对外暴露的地址，用于拼接图片访问 URL
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// 分享链接配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// 兑换页面所在站点，例如 https://cupones.example.com
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    pub share: ShareConfig,
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "coupon-service".to_string(),
            environment: "development".to_string(),
            provider: ProviderConfig::default(),
            server: ServerConfig::default(),
            share: ShareConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（COUPON_ 前缀，`__` 分隔层级，如 COUPON_PROVIDER__KIND -> provider.kind）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("COUPON_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    /// 从指定目录加载配置
    pub fn load_from(service_name: &str, env: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("COUPON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 获取服务监听地址，`port` 覆盖配置中的端口
    pub fn server_addr(&self, port: Option<u16>) -> String {
        format!("{}:{}", self.server.host, port.unwrap_or(self.server.port))
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
