//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图片摄取链路中的所有错误来源，避免字符串拼接式错误处理。
//! 每个阶段都返回 `Result<_, ImageError>`，由调用方决定记录日志、重试还是提示用户。
//!
//! ## 实现思路
//!
//! - `thiserror` 派生人类可读的错误消息。
//! - `code()` / `stage()` 提供稳定的机器可读标识，便于上层做结构化上报。
//! - 上传接口一侧的存储失败由 `upload::UploadError::SaveFailed` 表达，不在此枚举中。

/// 图片摄取统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// 输入缺少必需的文件。
    #[error("校验错误：{0}")]
    Validation(String),

    /// 上传接口不可达或返回非 2xx。
    #[error("网络错误：{0}")]
    Network(String),

    /// 无法读取图片尺寸或 Base64 内容。
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// 事件中没有可识别的图片，调用方应保持默认行为。
    #[error("未识别到图片输入")]
    UnrecognizedInput,

    /// 上传期间宿主文档已被销毁。
    #[error("文档已关闭")]
    DocumentClosed,

    #[error("文档错误：{0}")]
    Document(String),
}

impl ImageError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Network(_) => "E_NETWORK",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::UnrecognizedInput => "E_UNRECOGNIZED_INPUT",
            Self::DocumentClosed => "E_DOCUMENT_CLOSED",
            Self::Document(_) => "E_DOCUMENT",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::UnrecognizedInput => "normalize",
            Self::InvalidFormat(_) | Self::ResourceLimit(_) => "load",
            Self::Network(_) | Self::Timeout(_) => "upload",
            Self::Decode(_) => "decode",
            Self::DocumentClosed | Self::Document(_) => "insert",
        }
    }

    /// 是否属于“无需提示”的静默错误。
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::UnrecognizedInput)
    }
}
