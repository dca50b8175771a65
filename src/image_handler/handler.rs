//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排，不直接与宿主事件系统绑定。
//! 处理链路固定为：
//! 1. 规范化输入（选中候选 + 阻止默认行为）
//! 2. 文件候选上传（失败回退本地存储）
//! 3. 构造 `ImageDescriptor`
//! 4. 插入文档块
//!
//! ## 实现思路
//!
//! - 上传器通过泛型注入，默认使用 `RemoteUploadClient`，测试可替换为桩实现。
//! - 记录 `normalize/insert/total` 阶段耗时，便于性能诊断。
//! - 文档只以 `WeakDocument` 形式传入，上传前后都会检查存活。

use std::time::Instant;

use super::normalizer::{InputNormalizer, resolve_selection};
use super::source::{ImageDescriptor, ImageFile, InputEvent, UploadResult};
use super::uploader::{ImageUploader, RemoteUploadClient};
use super::{ImageConfig, ImageError};
use crate::document::{Editor, InsertedBlock, WeakDocument};

/// 图片摄取处理器。
pub struct ImageHandler<U: ImageUploader = RemoteUploadClient> {
    config: ImageConfig,
    normalizer: InputNormalizer,
    uploader: U,
}

impl ImageHandler<RemoteUploadClient> {
    /// 使用远程上传客户端创建处理器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use editor_image_ingest::image_handler::{ImageConfig, ImageHandler};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default())?;
    /// # Ok::<(), editor_image_ingest::image_handler::ImageError>(())
    /// ```
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        let uploader = RemoteUploadClient::new(&config)?;
        Ok(Self::with_uploader(config, uploader))
    }
}

impl<U: ImageUploader> ImageHandler<U> {
    pub fn with_uploader(config: ImageConfig, uploader: U) -> Self {
        Self {
            config,
            normalizer: InputNormalizer::new(),
            uploader,
        }
    }

    /// 替换提取策略集合。
    pub fn with_normalizer(mut self, normalizer: InputNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// 直接上传单个文件（编辑器插件的上传回调走这里）。
    pub async fn upload_file(&self, file: &ImageFile) -> Result<UploadResult, ImageError> {
        self.uploader.upload(file).await
    }

    /// 上传文件并构造描述，`alt` 由调用方给定。
    pub async fn describe_file(
        &self,
        file: &ImageFile,
        alt: impl Into<String>,
    ) -> Result<ImageDescriptor, ImageError> {
        let result = self.uploader.upload(file).await?;
        ImageDescriptor::from_upload(&result, alt, self.config.placeholder_size())
    }

    /// 处理一次事件，返回图片描述。
    pub async fn ingest(&self, event: &mut InputEvent) -> Result<ImageDescriptor, ImageError> {
        let start = Instant::now();
        let selection = self.normalizer.select(event, &self.config)?;
        let descriptor = resolve_selection(selection, &self.uploader, &self.config).await?;

        log::info!(
            "✅ 图片规范化完成 - 来源: {:?} 耗时: {}ms",
            event.origin(),
            start.elapsed().as_millis()
        );

        Ok(descriptor)
    }

    /// 处理一次事件并插入文档。
    ///
    /// 文档在上传前已销毁时直接返回，不发起上传。
    pub async fn ingest_into<E: Editor>(
        &self,
        event: &mut InputEvent,
        document: &WeakDocument<E>,
        position: Option<u32>,
    ) -> Result<InsertedBlock, ImageError> {
        if !document.is_alive() {
            return Err(ImageError::DocumentClosed);
        }

        let total_start = Instant::now();

        let normalize_start = Instant::now();
        let descriptor = self.ingest(event).await?;
        let normalize_elapsed = normalize_start.elapsed();

        let insert_start = Instant::now();
        let inserted = document.insert(descriptor, position)?;
        let insert_elapsed = insert_start.elapsed();

        log::info!(
            "✅ 图片摄取完成 - normalize={}ms insert={}ms total={}ms",
            normalize_elapsed.as_millis(),
            insert_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(inserted)
    }
}
