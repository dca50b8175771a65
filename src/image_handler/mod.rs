//! # 图片摄取模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“输入识别 → 加载校验 → 上传（含本地回退）→ 构造描述 → 插入文档”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：宿主编辑器入口（`IngestService`），失败只记日志
//! - `handler`：编排整条处理流水线
//! - `normalizer` / `extractor`：按优先级从事件中选出图片候选
//! - `loader`：Data URL 解析与文件签名校验
//! - `pipeline`：只读文件头获取尺寸 + 像素限制
//! - `uploader` / `fallback`：远程上传与本地 Data URL 回退
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 宿主 paste / drop 事件
//!    ↓
//! service.rs（调用方策略：日志 + 吞掉错误）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ normalizer.rs（选中候选 + preventDefault）
//!    │    └─ extractor.rs（files → items → html）
//!    ├─ uploader.rs（multipart 上传）
//!    │    └─ fallback.rs（失败回退 Data URL + 真实尺寸）
//!    └─ document（插入图片块）
//! ```
//!
//! ## 分层职责建议
//!
//! - 新增输入来源优先实现 `ImageExtractor`
//! - 配置与阈值变更优先改 `config.rs`
//! - 业务流程顺序变更优先改 `handler.rs`

mod config;
mod error;
mod extractor;
mod fallback;
mod handler;
mod loader;
mod normalizer;
mod pipeline;
mod service;
mod source;
mod uploader;

pub use config::{DEFAULT_UPLOAD_ENDPOINT, ImageConfig};
pub use error::ImageError;
pub use extractor::{
    ClipboardItemExtractor, FileListExtractor, HtmlImageExtractor, ImageCandidate, ImageExtractor,
    default_extractors,
};
pub use fallback::LocalFallbackStore;
pub use handler::ImageHandler;
pub use normalizer::{InputNormalizer, Selection};
pub use pipeline::inspect_dimensions;
pub use service::IngestService;
pub use source::{
    ClipboardItem, ClipboardItemKind, EventOrigin, ImageDescriptor, ImageFile, ImageSizes,
    InputEvent, RawInput, UploadOrigin, UploadResult,
};
pub use uploader::{ImageUploader, RemoteUploadClient};
