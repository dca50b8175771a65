//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理 Data URL 的解析、编码与图片签名校验，并在“尽可能早”的阶段执行输入校验。
//! 目标是尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - 解析：`data:<mime>;base64,<payload>` 解码前先估算体积上限；无 `base64` 标记时按百分号编码解码。
//! - 校验：头部未声明 `image/*` 时通过 `infer` 读取 magic bytes，拒绝非图片内容。
//! - 编码：本地回退路径把文件转成自包含的 Data URL。

use base64::{Engine as _, engine::general_purpose};
use percent_encoding::percent_decode_str;

use super::source::ImageFile;
use super::{ImageConfig, ImageError};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";
const BASE64_PARAM: &str = "base64";

/// 解析后的 Data URL。
#[derive(Debug)]
pub(crate) struct DataUrl {
    /// 头部声明的 MIME 类型（可能为空）。
    pub(crate) mime_type: String,
    pub(crate) bytes: Vec<u8>,
}

/// 判断字符串是否为图片 Data URL。
pub(crate) fn is_image_data_url(src: &str) -> bool {
    src.trim_start()
        .get(..DATA_URL_PREFIX.len() + 6)
        .is_some_and(|head| head.eq_ignore_ascii_case("data:image/"))
}

/// 把 Data URL 还原为可上传的文件。
///
/// 头部已声明 `image/*` 时直接采信（SVG 等无 magic bytes 的格式交由上传阶段处理），
/// 否则要求签名识别为图片。MIME 类型优先取头部声明，缺失时回退为签名识别结果。
pub(crate) fn load_from_data_url(
    data: &str,
    file_name: &str,
    config: &ImageConfig,
) -> Result<ImageFile, ImageError> {
    log::info!("📝 开始处理 Data URL 图片");

    let parsed = parse_data_url(data, config.max_file_size)?;

    if parsed.bytes.len() as u64 > config.max_file_size {
        return Err(ImageError::ResourceLimit(format!(
            "Data URL 解码后体积过大：{:.2} MB（限制：{:.2} MB）",
            parsed.bytes.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    if parsed.mime_type.starts_with("image/") {
        if parsed.bytes.is_empty() {
            return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
        }
    } else {
        validate_image_signature(&parsed.bytes)?;
    }

    let mime_type = if parsed.mime_type.is_empty() {
        sniff_mime(&parsed.bytes).unwrap_or("image/png").to_string()
    } else {
        parsed.mime_type
    };

    Ok(ImageFile::new(file_name, mime_type, parsed.bytes))
}

/// 将文件字节编码为 Data URL。
pub(crate) fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "{}{}{}{}",
        DATA_URL_PREFIX,
        mime_type,
        BASE64_MARKER,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// 通过 magic bytes 识别 MIME 类型。
pub(crate) fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// 解析 `data:<mime>[;参数][;base64],<payload>`；无 `base64` 标记时按百分号编码解码。
pub(crate) fn parse_data_url(data: &str, max_file_size: u64) -> Result<DataUrl, ImageError> {
    let normalized = data.trim();

    let header_and_payload = normalized
        .get(..DATA_URL_PREFIX.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(DATA_URL_PREFIX))
        .map(|_| &normalized[DATA_URL_PREFIX.len()..])
        .ok_or_else(|| ImageError::InvalidFormat("不是 Data URL".to_string()))?;

    let (header, payload) = header_and_payload
        .split_once(',')
        .ok_or_else(|| ImageError::InvalidFormat("缺少数据分隔符 ','".to_string()))?;

    let mut params = header.split(';');
    let mime_type = params.next().unwrap_or("").trim().to_ascii_lowercase();
    let is_base64 = params.any(|param| param.trim().eq_ignore_ascii_case(BASE64_PARAM));

    let bytes = if is_base64 {
        decode_base64_payload(payload, max_file_size)?
    } else {
        // 百分号解码后的长度不会超过原文长度
        if payload.len() as u64 > max_file_size {
            return Err(ImageError::ResourceLimit(format!(
                "Data URL 体积过大：{:.2} MB（限制：{:.2} MB）",
                payload.len() as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        percent_decode_str(payload).collect()
    };

    Ok(DataUrl { mime_type, bytes })
}

fn decode_base64_payload(payload: &str, max_file_size: u64) -> Result<Vec<u8>, ImageError> {
    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let estimated_len = estimate_base64_decoded_upper_bound_len(&payload)?;
    if estimated_len > max_file_size {
        return Err(ImageError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))
}

fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, ImageError> {
    let len = base64_data.len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| ImageError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| ImageError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}

/// 通过文件签名（magic bytes）校验输入是否为图片。
pub(crate) fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| ImageError::InvalidFormat("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(ImageError::InvalidFormat(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}
