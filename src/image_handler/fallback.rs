//! # 本地回退存储
//!
//! ## 设计思路
//!
//! 上传接口不可用时，把文件转换为自包含的 Data URL，无任何网络或磁盘 I/O。
//! 这是整条链路中唯一计算真实像素尺寸的地方，也是终端路径：失败直接返回错误，不再回退。

use super::loader::{encode_data_url, sniff_mime};
use super::pipeline::inspect_dimensions_with_limit;
use super::source::{ImageFile, UploadOrigin, UploadResult};
use super::{ImageConfig, ImageError};

const DEFAULT_FALLBACK_FORMAT: &str = "jpeg";

/// 本地回退存储。
#[derive(Debug, Clone)]
pub struct LocalFallbackStore {
    max_decoded_pixels: u64,
}

impl LocalFallbackStore {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            max_decoded_pixels: config.max_decoded_pixels,
        }
    }

    /// 文件 → Data URL + 真实尺寸。
    pub fn save(&self, file: &ImageFile) -> Result<UploadResult, ImageError> {
        if file.bytes.is_empty() {
            return Err(ImageError::Decode(format!("无法读取文件内容：{}", file.name)));
        }

        let mime_type = if file.mime_type.trim().is_empty() {
            sniff_mime(&file.bytes).unwrap_or("application/octet-stream")
        } else {
            file.mime_type.trim()
        };
        let src = encode_data_url(mime_type, &file.bytes);

        let (width, height) = inspect_dimensions_with_limit(&file.bytes, self.max_decoded_pixels)?;

        let format = file
            .mime_subtype()
            .unwrap_or(DEFAULT_FALLBACK_FORMAT)
            .to_string();

        log::info!(
            "💾 本地回退存储完成 - 文件: {} 尺寸: {}x{} 体积: {}B",
            file.name,
            width,
            height,
            file.size()
        );

        Ok(UploadResult {
            src,
            width,
            height,
            format,
            original_filename: file.name.clone(),
            bytes: file.size(),
            origin: UploadOrigin::Local,
        })
    }
}

impl Default for LocalFallbackStore {
    fn default() -> Self {
        Self::new(&ImageConfig::default())
    }
}
