//! 远程优惠券 API
//!
//! 基于内存存储实现 REST 后端所调用的 HTTP 契约，用于开发和测试环境。

pub mod remote_api;


pub use remote_api::{
    ErrorResponse, ObjectKeyResponse, ObjectUrlResponse, RemoteApiState, ScanCountResponse,
    remote_api_app, remote_api_routes,
};
