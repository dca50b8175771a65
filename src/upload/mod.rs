//! # 图片上传接口
//!
//! ## 设计思路
//!
//! `POST /api/upload-image` 接收 multipart 字段 `image` 中的单个文件，
//! 落盘后返回可公开访问的绝对 URL；`GET /uploads/*` 直接由 `ServeDir` 提供，
//! 保证返回的 URL 随后可以取回。
//!
//! ## 实现思路
//!
//! - 存储名由 `UploadStore` 生成，原始文件名只作为 `filename` 返回。
//! - 尺寸只读取文件头；无法识别时回退为占位尺寸 800×600。
//! - 不做体积与 MIME 校验，唯一上限是请求体大小限制（`DefaultBodyLimit`）。
//! - 所有错误都转换为 `UploadError`，以 `{"error": ...}` 结构返回并记录日志。

mod error;

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use crate::image_handler::{ImageConfig, inspect_dimensions};
use crate::settings::ServerSettings;
use crate::storage::{PUBLIC_PREFIX, UploadStore};

pub use error::UploadError;

/// 上传接口路径。
pub const UPLOAD_ROUTE: &str = "/api/upload-image";
/// multipart 中承载文件的字段名。
pub const UPLOAD_FIELD_NAME: &str = "image";

/// 上传成功的响应体；客户端与服务端共用同一份定义。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub filename: String,
    pub size: u64,
}

/// 路由共享状态
#[derive(Debug, Clone)]
pub struct UploadState {
    pub store: UploadStore,
    pub base_url: String,
    pub max_body_bytes: usize,
    pub placeholder: (u32, u32),
}

impl UploadState {
    pub fn new(store: UploadStore, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_body_bytes: ServerSettings::default().max_body_bytes,
            placeholder: ImageConfig::default().placeholder_size(),
        }
    }

    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            max_body_bytes: settings.max_body_bytes,
            ..Self::new(UploadStore::new(settings.upload_dir.clone()), settings.base_url())
        }
    }

    fn public_url(&self, public_path: &str) -> String {
        format!("{}{}", self.base_url, public_path)
    }
}

/// 构建上传路由（含静态文件服务）。
pub fn router(state: UploadState) -> Router {
    let uploads = ServeDir::new(state.store.dir().to_path_buf());
    let body_limit = state.max_body_bytes;

    Router::new()
        .route(UPLOAD_ROUTE, post(upload_image))
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(Arc::new(state))
}

async fn upload_image(
    State(state): State<Arc<UploadState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadError> {
    let mut multipart = multipart?;
    let (original_name, bytes) = read_image_field(&mut multipart).await?;

    log::info!("📥 收到上传 - 文件: {} 体积: {}B", original_name, bytes.len());

    let stored = state.store.save(&original_name, &bytes).await?;

    let (width, height) = match inspect_dimensions(&bytes) {
        Ok(dimensions) => dimensions,
        Err(err) => {
            log::warn!("⚠️ 无法读取图片尺寸（{}），使用占位尺寸", err);
            state.placeholder
        }
    };

    let url = state.public_url(&stored.public_path());
    log::info!("✅ 上传完成 - URL: {} 尺寸: {}x{}", url, width, height);

    Ok(Json(UploadResponse {
        url,
        width,
        height,
        format: stored.extension,
        filename: original_name,
        size: stored.size,
    }))
}

/// 读取第一个名为 `image` 且带文件名的字段。
async fn read_image_field(multipart: &mut Multipart) -> Result<(String, Bytes), UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            log::debug!("字段 {} 不是文件，忽略", UPLOAD_FIELD_NAME);
            continue;
        };
        let bytes = field.bytes().await?;
        return Ok((file_name, bytes));
    }
    Err(UploadError::NoFile)
}
