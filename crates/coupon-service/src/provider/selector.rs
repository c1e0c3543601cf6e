//! 后端选择器
//!
//! 启动时根据配置构造唯一的后端实例，显式注入门面层。
//! 未知的后端名称直接返回配置错误，不做回退。

use std::fmt;
use std::sync::Arc;

use tracing::info;

use coupon_shared::ProviderConfig;

use super::{CouponBackend, FirebaseBackend, MockBackend, ProviderKind, RestBackend};
use crate::error::Result;

/// 已选定的后端句柄
///
/// 克隆只复制引用，所有克隆共享同一个后端实例。
#[derive(Clone)]
pub struct ServiceProvider {
    backend: Arc<dyn CouponBackend>,
}

impl ServiceProvider {
    /// 按配置选择后端
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let kind: ProviderKind = config.kind.parse()?;

        let backend: Arc<dyn CouponBackend> = match kind {
            ProviderKind::Mock => Arc::new(MockBackend::from_config(&config.mock)),
            ProviderKind::Rest => Arc::new(RestBackend::new(&config.rest)?),
            ProviderKind::Firebase => Arc::new(FirebaseBackend::new()),
        };

        info!(provider = %kind, "后端已选定");
        Ok(Self { backend })
    }

    /// 使用已构造的后端
    pub fn new(backend: Arc<dyn CouponBackend>) -> Self {
        Self { backend }
    }

    pub fn name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn backend(&self) -> &dyn CouponBackend {
        self.backend.as_ref()
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("backend", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CouponError;

    fn config(kind: &str) -> ProviderConfig {
        ProviderConfig {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_select_each_backend() {
        assert_eq!(ServiceProvider::from_config(&config("mock")).unwrap().name(), "mock");
        assert_eq!(ServiceProvider::from_config(&config("AWS")).unwrap().name(), "rest");
        assert_eq!(
            ServiceProvider::from_config(&config("firebase")).unwrap().name(),
            "firebase"
        );
    }

    #[test]
    fn test_unknown_backend_fails_fast() {
        let err = ServiceProvider::from_config(&config("supabase")).unwrap_err();
        assert!(matches!(err, CouponError::Config(_)));
    }

    #[test]
    fn test_clones_share_backend() {
        let provider = ServiceProvider::from_config(&config("mock")).unwrap();
        let clone = provider.clone();
        assert!(std::ptr::addr_eq(
            provider.backend() as *const dyn CouponBackend,
            clone.backend() as *const dyn CouponBackend
        ));
    }
}
