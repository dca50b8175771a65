//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `InputEvent` 表示一次粘贴/拖放事件携带的全部数据
//! - `RawInput` 按优先级逐个暴露事件中的三类输入
//! - `ImageFile` 表示可上传的文件
//! - `UploadResult` 表示上传（或本地回退）后的结果
//! - `ImageDescriptor` 表示最终插入文档的图片引用

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::ImageError;

/// 可上传的图片文件（或候选文件）。
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// 原始文件名，仅作为元数据返回。
    pub name: String,
    /// MIME 类型，可能为空。
    pub mime_type: String,
    /// 文件完整字节。
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// 文件体积（字节）。
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME 类型中包含 `image` 即视为图片。
    pub fn is_image(&self) -> bool {
        self.mime_type.to_ascii_lowercase().contains("image")
    }

    /// MIME 子类型，例如 `image/png` → `png`。
    pub fn mime_subtype(&self) -> Option<&str> {
        self.mime_type
            .split_once('/')
            .map(|(_, subtype)| subtype.split(';').next().unwrap_or("").trim())
            .filter(|subtype| !subtype.is_empty())
    }
}

/// 剪贴板条目种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardItemKind {
    File,
    String,
}

/// 剪贴板条目：带种类与 MIME 类型，文件类条目可转换为 `ImageFile`。
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub kind: ClipboardItemKind,
    pub mime_type: String,
    pub name: Option<String>,
    pub data: Bytes,
}

impl ClipboardItem {
    /// 文件类条目。
    pub fn file(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            kind: ClipboardItemKind::File,
            mime_type: mime_type.into(),
            name: None,
            data: data.into(),
        }
    }

    /// 文本类条目。
    pub fn text(mime_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: ClipboardItemKind::String,
            mime_type: mime_type.into(),
            name: None,
            data: Bytes::from(text.into()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.to_ascii_lowercase().contains("image")
    }

    /// 转换为文件；文本类条目返回 `None`。
    ///
    /// 未携带文件名时按 MIME 子类型生成 `pasted-image.<subtype>`。
    pub fn as_file(&self) -> Option<ImageFile> {
        if self.kind != ClipboardItemKind::File {
            return None;
        }

        let name = self.name.clone().unwrap_or_else(|| {
            let subtype = self
                .mime_type
                .split_once('/')
                .map(|(_, subtype)| subtype)
                .filter(|subtype| !subtype.is_empty())
                .unwrap_or("png");
            format!("pasted-image.{}", subtype)
        });

        Some(ImageFile {
            name,
            mime_type: self.mime_type.clone(),
            bytes: self.data.clone(),
        })
    }
}

/// 事件来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    Paste,
    Drop,
}

/// 事件中的一类原始输入，按优先级依次暴露。
#[derive(Debug, Clone, Copy)]
pub enum RawInput<'a> {
    FileList(&'a [ImageFile]),
    ClipboardItemList(&'a [ClipboardItem]),
    HtmlFragment(&'a str),
}

impl RawInput<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileList(_) => "files",
            Self::ClipboardItemList(_) => "items",
            Self::HtmlFragment(_) => "html",
        }
    }
}

/// 一次粘贴或拖放事件。
///
/// `default_prevented` 只能由规范化器在选中图片的同一步骤中设置。
#[derive(Debug, Clone)]
pub struct InputEvent {
    origin: EventOrigin,
    files: Vec<ImageFile>,
    items: Vec<ClipboardItem>,
    html: Option<String>,
    default_prevented: bool,
}

impl InputEvent {
    pub fn paste() -> Self {
        Self {
            origin: EventOrigin::Paste,
            files: Vec::new(),
            items: Vec::new(),
            html: None,
            default_prevented: false,
        }
    }

    pub fn drop(files: Vec<ImageFile>) -> Self {
        Self {
            origin: EventOrigin::Drop,
            files,
            items: Vec::new(),
            html: None,
            default_prevented: false,
        }
    }

    pub fn with_files(mut self, files: Vec<ImageFile>) -> Self {
        self.files = files;
        self
    }

    pub fn with_items(mut self, items: Vec<ClipboardItem>) -> Self {
        self.items = items;
        self
    }

    /// 设置 `text/html` 载荷。
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn origin(&self) -> EventOrigin {
        self.origin
    }

    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    /// 按优先级返回事件中存在的输入：文件列表 → 剪贴板条目 → HTML。
    ///
    /// 拖放事件只考虑文件列表。
    pub fn inputs(&self) -> Vec<RawInput<'_>> {
        let mut inputs = Vec::with_capacity(3);

        if !self.files.is_empty() {
            inputs.push(RawInput::FileList(&self.files));
        }

        if self.origin == EventOrigin::Drop {
            return inputs;
        }

        if !self.items.is_empty() {
            inputs.push(RawInput::ClipboardItemList(&self.items));
        }

        if let Some(html) = self.html.as_deref().filter(|html| !html.trim().is_empty()) {
            inputs.push(RawInput::HtmlFragment(html));
        }

        inputs
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// 宿主是否应阻止浏览器默认的粘贴/拖放行为。
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// 上传结果来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadOrigin {
    Remote,
    Local,
}

/// 上传阶段输出：远程接口或本地回退二选一，字段总是完整填充。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub original_filename: String,
    pub bytes: u64,
    pub origin: UploadOrigin,
}

/// 图片尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSizes {
    pub width: u32,
    pub height: u32,
}

/// 摄取链路的最终输出，创建后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    src: String,
    alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
}

impl ImageDescriptor {
    /// `src` 不能为空；为 0 的尺寸视为未知。
    pub fn new(
        src: impl Into<String>,
        alt: impl Into<String>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Self, ImageError> {
        let src = src.into();
        if src.trim().is_empty() {
            return Err(ImageError::Validation("图片地址为空".to_string()));
        }

        Ok(Self {
            src,
            alt: alt.into(),
            width: width.filter(|w| *w > 0),
            height: height.filter(|h| *h > 0),
        })
    }

    /// 由上传结果构建；缺失的尺寸使用占位值。
    pub fn from_upload(
        result: &UploadResult,
        alt: impl Into<String>,
        placeholder: (u32, u32),
    ) -> Result<Self, ImageError> {
        let width = if result.width > 0 { result.width } else { placeholder.0 };
        let height = if result.height > 0 { result.height } else { placeholder.1 };
        Self::new(result.src.clone(), alt, Some(width), Some(height))
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn alt(&self) -> &str {
        &self.alt
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// 宽高同时已知时返回尺寸。
    pub fn sizes(&self) -> Option<ImageSizes> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some(ImageSizes { width, height }),
            _ => None,
        }
    }
}
