//! 远程优惠券 API 服务
//!
//! 提供优惠券的创建、查询、扫码计数以及对象存储端点，
//! 是 `RestBackend` 的服务端实现。

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::models::{Coupon, CouponRecord};
use crate::store::MemoryStore;

/// 远程 API 服务状态
pub struct RemoteApiState {
    pub coupons: MemoryStore<CouponRecord>,
    pub objects: MemoryStore<Vec<u8>>,
    /// 生成对象访问 URL 时使用的对外地址
    pub public_base_url: String,
}

impl RemoteApiState {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            coupons: MemoryStore::new(),
            objects: MemoryStore::new(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 对象访问地址，key 的每一段单独转义
    fn object_url(&self, key: &str) -> String {
        match Url::parse(&self.public_base_url) {
            Ok(mut url) if !url.cannot_be_a_base() => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push("objects").extend(key.split('/'));
                }
                url.into()
            }
            _ => format!("{}/objects/{}", self.public_base_url, key),
        }
    }
}

// ============================================================================
// 请求/响应 DTO
// ============================================================================

/// 扫码计数响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanCountResponse {
    pub id: String,
    pub scan_count: u64,
}

/// 对象上传响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectKeyResponse {
    pub key: String,
}

/// 对象 URL 响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectUrlResponse {
    pub url: String,
}

/// 错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ============================================================================
// 路由配置
// ============================================================================

/// 构建远程 API 路由
pub fn remote_api_routes() -> Router<Arc<RemoteApiState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/coupons", post(create_coupon).get(list_coupons))
        .route("/coupons/{coupon_id}", get(get_coupon))
        .route("/coupons/{coupon_id}/scan", put(increment_scan))
        .route("/objects/{*key}", put(put_object).get(get_object))
        .route("/object-urls/{*key}", get(get_object_url))
}

/// 构建带请求追踪的完整应用
pub fn remote_api_app(state: Arc<RemoteApiState>) -> Router {
    remote_api_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// 端点处理函数
// ============================================================================

async fn health_check() -> &'static str {
    "ok"
}

/// 创建优惠券
///
/// 记录必须可解析为合法优惠券；id 重复时返回 409
#[tracing::instrument(skip(state, record), fields(coupon_id = %record.id))]
async fn create_coupon(
    State(state): State<Arc<RemoteApiState>>,
    Json(record): Json<CouponRecord>,
) -> Result<(StatusCode, Json<CouponRecord>), ApiError> {
    if let Err(err) = Coupon::from_record(record.clone()) {
        return Err(api_error(StatusCode::BAD_REQUEST, err.to_string()));
    }

    if !state.coupons.insert_if_absent(&record.id, record.clone()) {
        return Err(api_error(
            StatusCode::CONFLICT,
            format!("优惠券已存在: {}", record.id),
        ));
    }

    tracing::info!("优惠券已保存");
    Ok((StatusCode::CREATED, Json(record)))
}

/// 获取优惠券详情
#[tracing::instrument(skip(state))]
async fn get_coupon(
    State(state): State<Arc<RemoteApiState>>,
    Path(coupon_id): Path<String>,
) -> Result<Json<CouponRecord>, ApiError> {
    state.coupons.get(&coupon_id).map(Json).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("优惠券不存在: {}", coupon_id),
        )
    })
}

/// 列出全部优惠券
async fn list_coupons(State(state): State<Arc<RemoteApiState>>) -> Json<Vec<CouponRecord>> {
    Json(state.coupons.list())
}

/// 扫码计数加一
#[tracing::instrument(skip(state))]
async fn increment_scan(
    State(state): State<Arc<RemoteApiState>>,
    Path(coupon_id): Path<String>,
) -> Result<Json<ScanCountResponse>, ApiError> {
    let record = state
        .coupons
        .update(&coupon_id, |record| record.scan_count += 1)
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                format!("优惠券不存在: {}", coupon_id),
            )
        })?;

    tracing::debug!(scan_count = record.scan_count, "扫码计数已更新");
    Ok(Json(ScanCountResponse {
        id: record.id,
        scan_count: record.scan_count,
    }))
}

/// 上传对象
#[tracing::instrument(skip(state, body), fields(size = body.len()))]
async fn put_object(
    State(state): State<Arc<RemoteApiState>>,
    Path(key): Path<String>,
    body: Bytes,
) -> Json<ObjectKeyResponse> {
    state.objects.insert(&key, body.to_vec());
    tracing::info!("对象已保存");
    Json(ObjectKeyResponse { key })
}

/// 下载对象内容
async fn get_object(
    State(state): State<Arc<RemoteApiState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state
        .objects
        .get(&key)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("对象不存在: {}", key)))?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

/// 获取对象访问 URL
async fn get_object_url(
    State(state): State<Arc<RemoteApiState>>,
    Path(key): Path<String>,
) -> Result<Json<ObjectUrlResponse>, ApiError> {
    if !state.objects.contains(&key) {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("对象不存在: {}", key),
        ));
    }

    Ok(Json(ObjectUrlResponse {
        url: state.object_url(&key),
    }))
}
