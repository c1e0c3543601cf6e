//! 优惠券服务错误类型
//!
//! 后端内部以 `Result<T, CouponError>` 传递错误，
//! 由门面层统一转换为 `{success, data, error}` 结果信封。

use thiserror::Error;

/// 优惠券服务错误类型
#[derive(Debug, Error)]
pub enum CouponError {
    // === 查询相关错误 ===
    #[error("Cupón con ID {0} no encontrado")]
    CouponNotFound(String),

    #[error("Imagen {0} no encontrada")]
    ImageNotFound(String),

    // === 写入相关错误 ===
    #[error("Error al crear cupón: {0}")]
    Creation(String),

    #[error("Datos de cupón inválidos: {0}")]
    Validation(String),

    // === 后端相关错误 ===
    #[error("{provider} implementation not yet available")]
    ProviderUnavailable { provider: String },

    #[error("Error de comunicación con el proveedor: {0}")]
    Transport(String),

    #[error("Registro de cupón inválido: {0}")]
    InvalidRecord(String),

    // === 启动配置错误 ===
    #[error("Configuración inválida: {0}")]
    Config(String),
}

/// 优惠券服务 Result 类型别名
pub type Result<T> = std::result::Result<T, CouponError>;

impl CouponError {
    /// 是否为可重试错误
    ///
    /// 仅网络/存储 I/O 失败可由调用方重试，核心内部不做重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// 获取错误码（用于日志与 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CouponNotFound(_) | Self::ImageNotFound(_) => "NOT_FOUND",
            Self::Creation(_) => "CREATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ProviderUnavailable { .. } => "PROVIDER_UNAVAILABLE",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::InvalidRecord(_) => "INVALID_RECORD",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<reqwest::Error> for CouponError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CouponError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
