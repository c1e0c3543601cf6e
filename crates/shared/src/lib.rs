//! 共享库
//!
//! 包含所有优惠券组件共用的配置加载与日志初始化代码。

pub mod config;
pub mod observability;

pub use config::{
    AppConfig, MockProviderConfig, ProviderConfig, RestProviderConfig, ServerConfig, ShareConfig,
};
pub use observability::{ObservabilityConfig, init_logging};
