//! # 服务层（调用方策略）
//!
//! ## 设计思路
//!
//! `ImageHandler` 的每个阶段都返回 `Result`，是否提示用户由调用方决定。
//! `IngestService` 是宿主编辑器使用的默认调用方：失败只记录日志，文档保持不变，
//! 单次失败不会影响后续的粘贴/拖放。
//!
//! ## 实现思路
//!
//! - 持有 `WeakDocument`，不延长文档生命周期。
//! - `UnrecognizedInput` 只记 debug 日志，其余错误带错误码与阶段记 error 日志。

use super::source::{EventOrigin, InputEvent};
use super::uploader::{ImageUploader, RemoteUploadClient};
use super::{ImageConfig, ImageError, ImageHandler};
use crate::document::{DocumentHandle, Editor, InsertedBlock, MemoryEditor, WeakDocument};

/// 面向宿主编辑器的摄取服务。
pub struct IngestService<E: Editor = MemoryEditor, U: ImageUploader = RemoteUploadClient> {
    handler: ImageHandler<U>,
    document: WeakDocument<E>,
}

impl<E: Editor> IngestService<E, RemoteUploadClient> {
    /// 使用默认远程上传客户端创建服务。
    pub fn new(config: ImageConfig, document: &DocumentHandle<E>) -> Result<Self, ImageError> {
        Ok(Self::with_handler(ImageHandler::new(config)?, document))
    }
}

impl<E: Editor, U: ImageUploader> IngestService<E, U> {
    pub fn with_handler(handler: ImageHandler<U>, document: &DocumentHandle<E>) -> Self {
        Self {
            handler,
            document: document.downgrade(),
        }
    }

    pub fn handler(&self) -> &ImageHandler<U> {
        &self.handler
    }

    /// 粘贴事件。处理方式由事件自身的 `origin()` 决定。
    pub async fn handle_paste(&self, event: &mut InputEvent) -> Option<InsertedBlock> {
        self.handle_event(event, None).await
    }

    /// 拖放事件。处理方式由事件自身的 `origin()` 决定。
    pub async fn handle_drop(&self, event: &mut InputEvent) -> Option<InsertedBlock> {
        self.handle_event(event, None).await
    }

    /// 处理任意事件；失败时记录日志并返回 `None`。
    pub async fn handle_event(
        &self,
        event: &mut InputEvent,
        position: Option<u32>,
    ) -> Option<InsertedBlock> {
        match self.handler.ingest_into(event, &self.document, position).await {
            Ok(inserted) => Some(inserted),
            Err(err) => {
                report_failure(event.origin(), &err);
                None
            }
        }
    }
}

fn report_failure(origin: EventOrigin, err: &ImageError) {
    if err.is_silent() {
        log::debug!("ℹ️ {:?} 事件未包含图片，交由默认行为处理", origin);
        return;
    }

    log::error!(
        "❌ 图片摄取失败 - 事件: {:?} code={} stage={} 错误: {}",
        origin,
        err.code(),
        err.stage(),
        err
    );
}
