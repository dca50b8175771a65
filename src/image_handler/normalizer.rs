//! # 输入规范化器
//!
//! ## 设计思路
//!
//! 一次粘贴/拖放事件按固定优先级处理，命中即停止：
//! 1. 直接文件列表
//! 2. 剪贴板条目
//! 3. HTML 中的 `<img>`（Data URL 或远程地址）
//! 4. 都未命中：返回 `UnrecognizedInput`，不阻止默认行为
//!
//! ## 实现思路
//!
//! - 选中候选与 `prevent_default` 在同一步骤完成（`select`），二者不会脱节，
//!   避免原始文本/HTML 与规范化后的图片重复插入。
//! - 文件候选走上传流程（含本地回退），远程地址直接构造描述，使用占位尺寸。

use super::extractor::{ImageCandidate, ImageExtractor, default_extractors};
use super::source::{EventOrigin, ImageDescriptor, InputEvent};
use super::uploader::ImageUploader;
use super::{ImageConfig, ImageError};

const PASTED_IMAGE_ALT: &str = "Pasted image";
const DROPPED_IMAGE_ALT: &str = "Dropped image";

/// 已选中的候选。
#[derive(Debug, Clone)]
pub struct Selection {
    pub candidate: ImageCandidate,
    pub alt: String,
    /// 命中的提取器名称。
    pub extractor: &'static str,
}

/// 输入规范化器：持有有序的提取策略集合。
pub struct InputNormalizer {
    extractors: Vec<Box<dyn ImageExtractor>>,
}

impl Default for InputNormalizer {
    fn default() -> Self {
        Self {
            extractors: default_extractors(),
        }
    }
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractors(extractors: Vec<Box<dyn ImageExtractor>>) -> Self {
        Self { extractors }
    }

    /// 在默认策略之后追加新的提取器。
    pub fn push_extractor(&mut self, extractor: Box<dyn ImageExtractor>) {
        self.extractors.push(extractor);
    }

    pub fn extractor_names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|extractor| extractor.name()).collect()
    }

    /// 按优先级选出第一个候选，并在同一步骤阻止默认行为。
    pub fn select(&self, event: &mut InputEvent, config: &ImageConfig) -> Result<Selection, ImageError> {
        let found = {
            let mut found = None;
            'inputs: for input in event.inputs() {
                for extractor in &self.extractors {
                    if let Some(candidate) = extractor.extract(&input, config)? {
                        log::info!("🎯 命中图片输入 - 来源: {} 提取器: {}", input.kind(), extractor.name());
                        found = Some((candidate, extractor.name()));
                        break 'inputs;
                    }
                }
            }
            found
        };

        let Some((candidate, extractor)) = found else {
            log::debug!("🚫 事件中未发现图片，保持默认行为");
            return Err(ImageError::UnrecognizedInput);
        };

        event.prevent_default();
        let alt = default_alt(event.origin(), &candidate);

        Ok(Selection {
            candidate,
            alt,
            extractor,
        })
    }

    /// 完整规范化：选中候选 → 必要时上传 → 构造 `ImageDescriptor`。
    pub async fn normalize<U: ImageUploader>(
        &self,
        event: &mut InputEvent,
        uploader: &U,
        config: &ImageConfig,
    ) -> Result<ImageDescriptor, ImageError> {
        let selection = self.select(event, config)?;
        resolve_selection(selection, uploader, config).await
    }
}

/// 把选中的候选转换为最终描述。
pub(crate) async fn resolve_selection<U: ImageUploader>(
    selection: Selection,
    uploader: &U,
    config: &ImageConfig,
) -> Result<ImageDescriptor, ImageError> {
    match selection.candidate {
        ImageCandidate::File(file) => {
            let result = uploader.upload(&file).await?;
            ImageDescriptor::from_upload(&result, selection.alt, config.placeholder_size())
        }
        ImageCandidate::RemoteUrl(url) => ImageDescriptor::new(
            url,
            selection.alt,
            Some(config.placeholder_width),
            Some(config.placeholder_height),
        ),
    }
}

fn default_alt(origin: EventOrigin, candidate: &ImageCandidate) -> String {
    match (origin, candidate) {
        (EventOrigin::Paste, _) => PASTED_IMAGE_ALT.to_string(),
        (EventOrigin::Drop, ImageCandidate::File(file)) => format!("{}: {}", DROPPED_IMAGE_ALT, file.name),
        (EventOrigin::Drop, ImageCandidate::RemoteUrl(_)) => DROPPED_IMAGE_ALT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::loader::encode_data_url;
    use crate::image_handler::source::{ClipboardItem, ImageFile, RawInput, UploadOrigin, UploadResult};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;
    use std::sync::Mutex;

    /// 记录调用的上传桩，返回固定尺寸。
    #[derive(Default)]
    struct RecordingUploader {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingUploader {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl ImageUploader for RecordingUploader {
        async fn upload(&self, file: &ImageFile) -> Result<UploadResult, ImageError> {
            self.calls.lock().expect("calls lock").push(file.name.clone());
            Ok(UploadResult {
                src: format!("http://localhost:3000/uploads/{}", file.name),
                width: 640,
                height: 480,
                format: "png".to_string(),
                original_filename: file.name.clone(),
                bytes: file.size(),
                origin: UploadOrigin::Remote,
            })
        }
    }

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |_, _| Rgba([0, 0, 0, 255]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    #[tokio::test]
    async fn paste_with_image_file_and_text_item_selects_file() {
        let normalizer = InputNormalizer::new();
        let uploader = RecordingUploader::default();
        let mut event = InputEvent::paste()
            .with_files(vec![ImageFile::new("screen.png", "image/png", create_png_bytes(2, 2))])
            .with_items(vec![ClipboardItem::text("text/plain", "caption")]);

        let descriptor = normalizer
            .normalize(&mut event, &uploader, &ImageConfig::default())
            .await
            .expect("normalize");

        assert!(event.is_default_prevented());
        assert_eq!(uploader.calls(), vec!["screen.png".to_string()]);
        assert_eq!(descriptor.alt(), "Pasted image");
        assert_eq!(descriptor.src(), "http://localhost:3000/uploads/screen.png");
        assert_eq!((descriptor.width(), descriptor.height()), (Some(640), Some(480)));
    }

    #[tokio::test]
    async fn remote_img_in_html_skips_upload() {
        let normalizer = InputNormalizer::new();
        let uploader = RecordingUploader::default();
        let mut event = InputEvent::paste().with_html(r#"<img src="https://example.com/a.png">"#);

        let descriptor = normalizer
            .normalize(&mut event, &uploader, &ImageConfig::default())
            .await
            .expect("normalize");

        assert!(uploader.calls().is_empty());
        assert_eq!(descriptor.src(), "https://example.com/a.png");
        assert_eq!((descriptor.width(), descriptor.height()), (Some(800), Some(600)));
        assert!(event.is_default_prevented());
    }

    #[tokio::test]
    async fn data_url_img_runs_upload_path() {
        let normalizer = InputNormalizer::new();
        let uploader = RecordingUploader::default();
        let html = format!(r#"<div><img src="{}"></div>"#, encode_data_url("image/png", &create_png_bytes(3, 3)));
        let mut event = InputEvent::paste().with_html(html);

        normalizer
            .normalize(&mut event, &uploader, &ImageConfig::default())
            .await
            .expect("normalize");

        assert_eq!(uploader.calls(), vec!["pasted-image.png".to_string()]);
    }

    #[tokio::test]
    async fn svg_data_urls_in_html_run_upload_path() {
        let normalizer = InputNormalizer::new();
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"/>"#;

        let sources = [
            encode_data_url("image/svg+xml", svg),
            "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%2F%3E".to_string(),
        ];

        for src in sources {
            let uploader = RecordingUploader::default();
            let mut event = InputEvent::paste().with_html(format!(r#"<img src="{}">"#, src));

            normalizer
                .normalize(&mut event, &uploader, &ImageConfig::default())
                .await
                .expect("svg data url should normalize");

            assert_eq!(uploader.calls(), vec!["pasted-image.png".to_string()]);
            assert!(event.is_default_prevented());
        }
    }

    #[tokio::test]
    async fn unrecognized_input_leaves_default_behaviour() {
        let normalizer = InputNormalizer::new();
        let uploader = RecordingUploader::default();
        let mut event = InputEvent::paste()
            .with_items(vec![ClipboardItem::text("text/plain", "just text")])
            .with_html("<p>just text</p>");

        let result = normalizer
            .normalize(&mut event, &uploader, &ImageConfig::default())
            .await;

        assert!(matches!(result, Err(ImageError::UnrecognizedInput)));
        assert!(!event.is_default_prevented());
        assert!(uploader.calls().is_empty());
    }

    #[tokio::test]
    async fn drop_uses_file_name_in_alt_and_ignores_html() {
        let normalizer = InputNormalizer::new();
        let uploader = RecordingUploader::default();
        let mut event = InputEvent::drop(vec![
            ImageFile::new("readme.md", "text/markdown", b"# hi".to_vec()),
            ImageFile::new("photo.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF]),
        ])
        .with_html(r#"<img src="https://example.com/ignored.png">"#);

        let descriptor = normalizer
            .normalize(&mut event, &uploader, &ImageConfig::default())
            .await
            .expect("normalize");

        assert_eq!(descriptor.alt(), "Dropped image: photo.jpg");
        assert_eq!(uploader.calls(), vec!["photo.jpg".to_string()]);
    }

    #[test]
    fn custom_extractor_is_consulted_after_defaults() {
        struct EmbedExtractor;

        impl ImageExtractor for EmbedExtractor {
            fn name(&self) -> &'static str {
                "embed"
            }

            fn extract(
                &self,
                input: &RawInput<'_>,
                _config: &ImageConfig,
            ) -> Result<Option<ImageCandidate>, ImageError> {
                match input {
                    RawInput::HtmlFragment(html) if html.contains("<embed") => {
                        Ok(Some(ImageCandidate::RemoteUrl("https://embed.test/a.png".to_string())))
                    }
                    _ => Ok(None),
                }
            }
        }

        let mut normalizer = InputNormalizer::new();
        normalizer.push_extractor(Box::new(EmbedExtractor));
        assert_eq!(normalizer.extractor_names(), vec!["files", "items", "html", "embed"]);

        let mut event = InputEvent::paste().with_html(r#"<embed src="x">"#);
        let selection = normalizer
            .select(&mut event, &ImageConfig::default())
            .expect("select");

        assert_eq!(selection.extractor, "embed");
        assert!(event.is_default_prevented());
    }
}
