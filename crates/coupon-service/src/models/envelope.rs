//! 统一结果信封
//!
//! 门面层的所有操作都返回 `{success, data, error}` 形态：
//! 成功时 `error` 为空；失败时 `data` 为空或安全默认值（列表为空、布尔为 false）。

use serde::{Deserialize, Serialize};

/// 操作结果信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ServiceResult<T> {
    /// 创建成功结果
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// 创建失败结果，data 为空
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// 创建失败结果，data 为安全默认值
    pub fn fail_with(default: T, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(default),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// 转换为标准 Result，便于调用方使用 `?`
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(self
                .error
                .unwrap_or_else(|| "Ha ocurrido un error desconocido".to_string())),
        }
    }
}
