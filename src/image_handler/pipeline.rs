//! # 尺寸读取模块
//!
//! ## 设计思路
//!
//! 摄取链路只需要“读尺寸”，不做任何缩放或像素变换。
//! 只读取图片头信息，避免完整解码带来的内存开销；在返回前做像素上限检查。

use image::ImageReader;
use std::io::Cursor;

use super::ImageError;

/// 仅通过内存中的图片头信息读取宽高。
pub fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Decode("图片内容为空".to_string()));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(format!("无法识别图片格式：{}", e)))?;

    if reader.format().is_none() {
        return Err(ImageError::Decode("无法识别图片格式".to_string()));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))?;

    if width == 0 || height == 0 {
        return Err(ImageError::Decode(format!("图片尺寸无效：{}x{}", width, height)));
    }

    Ok((width, height))
}

/// 读取尺寸并校验像素数量是否超过上限。
pub(crate) fn inspect_dimensions_with_limit(
    bytes: &[u8],
    max_decoded_pixels: u64,
) -> Result<(u32, u32), ImageError> {
    let (width, height) = inspect_dimensions(bytes)?;
    validate_pixel_limits(max_decoded_pixels, width, height)?;
    Ok((width, height))
}

fn validate_pixel_limits(max_decoded_pixels: u64, width: u32, height: u32) -> Result<(), ImageError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > max_decoded_pixels {
        return Err(ImageError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, max_decoded_pixels
        )));
    }

    Ok(())
}
