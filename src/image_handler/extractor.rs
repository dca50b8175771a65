//! # 图片提取策略
//!
//! ## 设计思路
//!
//! 每种输入格式对应一个提取器，统一实现“尝试提取图片引用，否则拒绝”的能力。
//! 分发逻辑只负责按顺序询问，新增提取器（例如其他嵌入标记）无需改动分发代码。
//!
//! ## 实现思路
//!
//! - `FileListExtractor`：文件列表中第一个 MIME 含 `image` 的文件。
//! - `ClipboardItemExtractor`：剪贴板条目中第一个 MIME 含 `image` 且可转为文件的条目。
//! - `HtmlImageExtractor`：HTML 中第一个 `<img src>`，Data URL 还原为文件，
//!   `http(s)` 地址直接作为远程引用。

use once_cell::sync::Lazy;
use regex::Regex;

use super::loader::{is_image_data_url, load_from_data_url};
use super::source::{ImageFile, RawInput};
use super::{ImageConfig, ImageError};

static IMG_SRC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]+)"|'([^']+)')"#)
        .expect("valid <img> pattern")
});

/// 提取结果。
#[derive(Debug, Clone)]
pub enum ImageCandidate {
    /// 需要走上传流程的文件。
    File(ImageFile),
    /// 已由远程主机提供的图片地址，无需上传。
    RemoteUrl(String),
}

/// 提取策略：从一类输入中提取图片引用，或返回 `None` 表示拒绝。
pub trait ImageExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(
        &self,
        input: &RawInput<'_>,
        config: &ImageConfig,
    ) -> Result<Option<ImageCandidate>, ImageError>;
}

/// 直接文件列表。
#[derive(Debug, Default, Clone, Copy)]
pub struct FileListExtractor;

impl ImageExtractor for FileListExtractor {
    fn name(&self) -> &'static str {
        "files"
    }

    fn extract(
        &self,
        input: &RawInput<'_>,
        _config: &ImageConfig,
    ) -> Result<Option<ImageCandidate>, ImageError> {
        let RawInput::FileList(files) = input else {
            return Ok(None);
        };

        for (idx, file) in files.iter().enumerate() {
            log::debug!("🔍 文件 {} - type: {} name: {}", idx, file.mime_type, file.name);
            if file.is_image() {
                return Ok(Some(ImageCandidate::File(file.clone())));
            }
        }

        Ok(None)
    }
}

/// 剪贴板条目。
#[derive(Debug, Default, Clone, Copy)]
pub struct ClipboardItemExtractor;

impl ImageExtractor for ClipboardItemExtractor {
    fn name(&self) -> &'static str {
        "items"
    }

    fn extract(
        &self,
        input: &RawInput<'_>,
        _config: &ImageConfig,
    ) -> Result<Option<ImageCandidate>, ImageError> {
        let RawInput::ClipboardItemList(items) = input else {
            return Ok(None);
        };

        for (idx, item) in items.iter().enumerate() {
            log::debug!("🔍 条目 {} - type: {} kind: {:?}", idx, item.mime_type, item.kind);
            if !item.is_image() {
                continue;
            }
            if let Some(file) = item.as_file() {
                return Ok(Some(ImageCandidate::File(file)));
            }
        }

        Ok(None)
    }
}

/// HTML 片段中的 `<img>`。
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlImageExtractor;

impl HtmlImageExtractor {
    /// 返回第一个 `<img>` 的 `src`（已还原 `&amp;`）。
    pub fn find_img_src(html: &str) -> Option<String> {
        let captures = IMG_SRC_PATTERN.captures(html)?;
        let raw = captures.get(1).or_else(|| captures.get(2))?.as_str().trim();
        if raw.is_empty() {
            return None;
        }
        Some(raw.replace("&amp;", "&"))
    }

    fn is_remote_url(src: &str) -> bool {
        reqwest::Url::parse(src)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
            .unwrap_or(false)
    }
}

impl ImageExtractor for HtmlImageExtractor {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extract(
        &self,
        input: &RawInput<'_>,
        config: &ImageConfig,
    ) -> Result<Option<ImageCandidate>, ImageError> {
        let RawInput::HtmlFragment(html) = input else {
            return Ok(None);
        };

        let Some(src) = Self::find_img_src(html) else {
            return Ok(None);
        };

        if is_image_data_url(&src) {
            log::debug!("🔍 HTML 中发现 Data URL 图片");
            let file = load_from_data_url(&src, &config.pasted_file_name, config)?;
            return Ok(Some(ImageCandidate::File(file)));
        }

        if Self::is_remote_url(&src) {
            log::debug!("🔍 HTML 中发现远程图片：{}", src);
            return Ok(Some(ImageCandidate::RemoteUrl(src)));
        }

        log::debug!("🚫 HTML 中的图片地址不受支持，跳过：{}", src);
        Ok(None)
    }
}

/// 默认提取器顺序。
pub fn default_extractors() -> Vec<Box<dyn ImageExtractor>> {
    vec![
        Box::new(FileListExtractor),
        Box::new(ClipboardItemExtractor),
        Box::new(HtmlImageExtractor),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::source::ClipboardItem;
    use proptest::prelude::*;

    #[test]
    fn file_extractor_picks_first_image() {
        let files = vec![
            ImageFile::new("notes.txt", "text/plain", b"hi".to_vec()),
            ImageFile::new("a.gif", "image/gif", vec![1u8]),
            ImageFile::new("b.png", "image/png", vec![2u8]),
        ];

        let candidate = FileListExtractor
            .extract(&RawInput::FileList(&files), &ImageConfig::default())
            .expect("extract");

        match candidate {
            Some(ImageCandidate::File(file)) => assert_eq!(file.name, "a.gif"),
            other => panic!("unexpected candidate: {:?}", other),
        }
    }

    #[test]
    fn extractors_decline_foreign_inputs() {
        let config = ImageConfig::default();
        let html = RawInput::HtmlFragment("<img src=\"https://example.com/a.png\">");

        assert!(FileListExtractor.extract(&html, &config).expect("extract").is_none());
        assert!(ClipboardItemExtractor.extract(&html, &config).expect("extract").is_none());
    }

    #[test]
    fn item_extractor_skips_text_items() {
        let items = vec![
            ClipboardItem::text("text/plain", "hello"),
            ClipboardItem::text("image/png", "string-kind image"),
            ClipboardItem::file("image/png", vec![9u8]).with_name("clip.png"),
        ];

        let candidate = ClipboardItemExtractor
            .extract(&RawInput::ClipboardItemList(&items), &ImageConfig::default())
            .expect("extract");

        match candidate {
            Some(ImageCandidate::File(file)) => assert_eq!(file.name, "clip.png"),
            other => panic!("unexpected candidate: {:?}", other),
        }
    }

    #[test]
    fn html_extractor_returns_remote_url() {
        let input = RawInput::HtmlFragment(r#"<p>x</p><IMG alt="a" SRC="https://example.com/a.png?x=1&amp;y=2">"#);

        let candidate = HtmlImageExtractor
            .extract(&input, &ImageConfig::default())
            .expect("extract");

        match candidate {
            Some(ImageCandidate::RemoteUrl(url)) => assert_eq!(url, "https://example.com/a.png?x=1&y=2"),
            other => panic!("unexpected candidate: {:?}", other),
        }
    }

    #[test]
    fn html_extractor_declines_relative_and_missing_src() {
        let config = ImageConfig::default();

        let relative = RawInput::HtmlFragment(r#"<img src="/static/a.png">"#);
        assert!(HtmlImageExtractor.extract(&relative, &config).expect("extract").is_none());

        let plain = RawInput::HtmlFragment("<p>no images here</p>");
        assert!(HtmlImageExtractor.extract(&plain, &config).expect("extract").is_none());
    }

    #[test]
    fn single_quoted_src_is_supported() {
        assert_eq!(
            HtmlImageExtractor::find_img_src("<img width=10 src='http://a.test/x.jpg'>").as_deref(),
            Some("http://a.test/x.jpg")
        );
    }

    proptest! {
        #[test]
        fn first_img_src_is_found_in_surrounding_markup(
            prefix in "[a-z <>/]{0,40}",
            path in "[a-z0-9]{1,12}",
        ) {
            let url = format!("https://cdn.example.com/{}.png", path);
            let html = format!("{}<img class=\"x\" src=\"{}\"><img src=\"https://other.test/b.png\">", prefix, url);

            prop_assert_eq!(HtmlImageExtractor::find_img_src(&html), Some(url));
        }
    }
}
