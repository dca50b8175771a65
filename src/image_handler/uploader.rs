//! # 远程上传客户端
//!
//! ## 设计思路
//!
//! 上传接口只是“尽力而为”的存储：任何失败（连接失败、非 2xx、响应格式错误）
//! 都透明回退到 `LocalFallbackStore`，摄取链路永远不会因上传接口短暂不可用而阻塞。
//!
//! ## 实现思路
//!
//! - `ImageUploader` 是“上传文件 → 得到 `UploadResult`”的唯一契约，便于测试替换。
//! - 复用同一个 `reqwest::Client`，连接/总超时来自 `ImageConfig`。
//! - 响应字段映射：`url → src`，`filename → original_filename`，`size → bytes`。

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};

use super::fallback::LocalFallbackStore;
use super::source::{ImageFile, UploadOrigin, UploadResult};
use super::{ImageConfig, ImageError};
use crate::upload::{UPLOAD_FIELD_NAME, UploadResponse};

/// 上传契约：上传一个文件，得到完整填充的 `UploadResult`。
pub trait ImageUploader: Send + Sync {
    fn upload(&self, file: &ImageFile) -> impl Future<Output = Result<UploadResult, ImageError>> + Send;
}

/// 调用上传接口的客户端，失败时回退到本地存储。
#[derive(Debug, Clone)]
pub struct RemoteUploadClient {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    fallback: LocalFallbackStore,
}

impl RemoteUploadClient {
    pub fn new(config: &ImageConfig) -> Result<Self, ImageError> {
        let endpoint = reqwest::Url::parse(&config.upload_endpoint)
            .map_err(|e| ImageError::InvalidFormat(format!("上传地址格式错误：{}", e)))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.upload_timeout))
            .build()
            .map_err(|e| ImageError::Network(format!("HTTP 客户端初始化失败：{}", e)))?;

        Ok(Self {
            client,
            endpoint,
            fallback: LocalFallbackStore::new(config),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// 只走服务器上传，不回退。
    pub async fn upload_to_server(&self, file: &ImageFile) -> Result<UploadResult, ImageError> {
        let start = Instant::now();
        log::debug!("📡 上传图片到服务器 - 文件: {} 体积: {}B", file.name, file.size());

        let part = Part::bytes(file.bytes.to_vec()).file_name(file.name.clone());
        let part = if file.mime_type.trim().is_empty() {
            part
        } else {
            part.mime_str(file.mime_type.trim())
                .map_err(|e| ImageError::InvalidFormat(format!("MIME 类型无效：{}", e)))?
        };
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Network(format!(
                "上传失败 HTTP {}: {}",
                status.as_u16(),
                status_message(status.as_u16())
            )));
        }

        let data: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Network(format!("上传响应解析失败：{}", e)))?;

        if data.url.trim().is_empty() {
            return Err(ImageError::Network("上传响应缺少 url".to_string()));
        }

        log::info!(
            "🌐 服务器上传成功，URL: {} upload={}ms",
            data.url,
            start.elapsed().as_millis()
        );

        Ok(UploadResult {
            src: data.url,
            width: data.width,
            height: data.height,
            format: data.format,
            original_filename: data.filename,
            bytes: data.size,
            origin: UploadOrigin::Remote,
        })
    }
}

impl ImageUploader for RemoteUploadClient {
    async fn upload(&self, file: &ImageFile) -> Result<UploadResult, ImageError> {
        match self.upload_to_server(file).await {
            Ok(result) => Ok(result),
            Err(err) => {
                log::warn!("⚠️ 服务器上传失败（{}），回退到本地存储", err);
                self.fallback.save(file)
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ImageError {
    if e.is_timeout() {
        ImageError::Timeout(format!("上传超时：{}", e))
    } else if e.is_connect() {
        ImageError::Network(format!("无法连接上传接口：{}", e))
    } else {
        ImageError::Network(format!("上传请求失败：{}", e))
    }
}

/// 常见 HTTP 状态码本地化文案。
fn status_message(code: u16) -> &'static str {
    match code {
        400 => "请求无效",
        404 => "未找到",
        413 => "请求体过大",
        500..=599 => "服务器错误",
        _ => "请求失败",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |_, _| Rgba([1, 2, 3, 255]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn unreachable_config() -> ImageConfig {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
        let port = listener.local_addr().expect("probe addr").port();
        drop(listener);

        let mut config = ImageConfig::with_endpoint(format!("http://127.0.0.1:{}/api/upload-image", port));
        config.connect_timeout = 1;
        config.upload_timeout = 2;
        config
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let config = ImageConfig::with_endpoint("not a url");
        assert!(matches!(RemoteUploadClient::new(&config), Err(ImageError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back_to_local_store() {
        let client = RemoteUploadClient::new(&unreachable_config()).expect("client init");
        let file = ImageFile::new("shot.png", "image/png", create_png_bytes(31, 17));

        assert!(client.upload_to_server(&file).await.is_err());

        let result = client.upload(&file).await.expect("fallback should resolve");
        assert_eq!(result.origin, UploadOrigin::Local);
        assert_eq!((result.width, result.height), (31, 17));
        assert!(result.src.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn fallback_decode_failure_propagates() {
        let client = RemoteUploadClient::new(&unreachable_config()).expect("client init");
        let file = ImageFile::new("broken.png", "image/png", b"garbage".to_vec());

        let result = client.upload(&file).await;
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn status_messages_cover_server_errors() {
        assert_eq!(status_message(502), "服务器错误");
        assert_eq!(status_message(404), "未找到");
        assert_eq!(status_message(418), "请求失败");
    }
}
