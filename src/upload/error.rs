//! 上传接口错误
//!
//! 每个变体对应一个固定的对外文案，内部细节只进日志，不进入响应体。

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum UploadError {
    /// 请求中没有名为 `image` 的文件字段
    #[error("No file provided")]
    NoFile,

    /// 建目录或写文件失败
    #[error("Failed to save the file")]
    SaveFailed(String),

    /// 其余意外失败（multipart 解析、读取请求体等）
    #[error("Failed to process the image")]
    ProcessFailed(String),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoFile => StatusCode::BAD_REQUEST,
            Self::SaveFailed(_) | Self::ProcessFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &str {
        match self {
            Self::NoFile => "",
            Self::SaveFailed(detail) | Self::ProcessFailed(detail) => detail,
        }
    }
}

impl From<MultipartRejection> for UploadError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::ProcessFailed(rejection.body_text())
    }
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        Self::ProcessFailed(err.body_text())
    }
}

impl From<AppError> for UploadError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Io(_) | AppError::Storage(_) => Self::SaveFailed(err.to_string()),
            AppError::Config(_) => Self::ProcessFailed(err.to_string()),
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.detail().is_empty() {
            log::error!("❌ 上传接口返回 {}: {}", status.as_u16(), self);
        } else {
            log::error!("❌ 上传接口返回 {}: {} ({})", status.as_u16(), self, self.detail());
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
