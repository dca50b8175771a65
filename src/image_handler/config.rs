//! # 配置模块
//!
//! ## 设计思路
//!
//! 将摄取链路中所有“可调策略”集中到 `ImageConfig`，保证行为可观测、可调整、可测试。
//!
//! ## 实现思路
//!
//! - `Default` 提供本地开发可直接使用的配置（指向 `localhost:3000` 的上传接口）。
//! - 占位尺寸 800×600 只在无法得知真实尺寸时使用。

/// 默认上传接口地址。
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://localhost:3000/api/upload-image";

/// 图片摄取配置。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 上传接口的绝对地址。
    pub upload_endpoint: String,
    /// 建立连接（TCP/TLS）超时时间（秒）。
    pub connect_timeout: u64,
    /// 单次上传请求总超时（秒）。
    pub upload_timeout: u64,
    /// Data URL 解码后允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 读取尺寸时允许的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 无法得知真实尺寸时使用的占位宽度。
    pub placeholder_width: u32,
    /// 无法得知真实尺寸时使用的占位高度。
    pub placeholder_height: u32,
    /// 从 HTML Data URL 中还原文件时使用的文件名。
    pub pasted_file_name: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            upload_endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            connect_timeout: 5,
            upload_timeout: 30,
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            placeholder_width: 800,
            placeholder_height: 600,
            pasted_file_name: "pasted-image.png".to_string(),
        }
    }
}

impl ImageConfig {
    /// 以指定上传地址构建配置，其余字段取默认值。
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            upload_endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// 占位尺寸 `(width, height)`。
    pub fn placeholder_size(&self) -> (u32, u32) {
        (self.placeholder_width, self.placeholder_height)
    }
}
