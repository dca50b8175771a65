//! # 文档块插入桥
//!
//! ## 设计思路
//!
//! 文档模型归外部编辑器所有，这里只通过 `Editor` 契约（读取当前值、整体 `set_value`）与之交互。
//! 所有处理器都通过显式传入的 `DocumentHandle` / `WeakDocument` 访问同一份文档，
//! 不依赖模块级或闭包捕获的可变状态。
//!
//! ## 实现思路
//!
//! - `DocumentHandle` 用 `Arc<Mutex<E>>` 持有编辑器，顺序号的读取与提交在同一把锁内完成，
//!   并发插入因此被串行化，不会出现两个块拿到同一个 `order`。
//! - 新块记录在提交前完整构造，构造失败时文档保持不变；每次插入只调用一次 `set_value`。
//! - 上传期间只持有 `WeakDocument`，文档被销毁后插入返回 `DocumentClosed`。

mod block;

use std::sync::{Arc, Mutex, Weak};

use uuid::Uuid;

use crate::image_handler::{ImageDescriptor, ImageError};

pub use block::{
    Block, BlockElement, BlockMeta, DocumentValue, IMAGE_BLOCK_TYPE, IMAGE_ELEMENT_TYPE,
    ImageElementProps, TextLeaf,
};

/// 外部编辑器模型契约。
pub trait Editor: Send {
    fn value(&self) -> &DocumentValue;

    fn set_value(&mut self, value: DocumentValue);
}

/// 内存中的编辑器模型，记录 `set_value` 次数。
#[derive(Debug, Default, Clone)]
pub struct MemoryEditor {
    value: DocumentValue,
    revisions: u64,
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: DocumentValue) -> Self {
        Self { value, revisions: 0 }
    }

    /// 已提交的 `set_value` 次数。
    pub fn revisions(&self) -> u64 {
        self.revisions
    }
}

impl Editor for MemoryEditor {
    fn value(&self) -> &DocumentValue {
        &self.value
    }

    fn set_value(&mut self, value: DocumentValue) {
        self.value = value;
        self.revisions += 1;
    }
}

/// 插入结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedBlock {
    pub block_id: String,
    pub order: u32,
}

/// 文档句柄（强引用）。
pub struct DocumentHandle<E: Editor = MemoryEditor> {
    inner: Arc<Mutex<E>>,
}

impl<E: Editor> Clone for DocumentHandle<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Editor> DocumentHandle<E> {
    pub fn new(editor: E) -> Self {
        Self {
            inner: Arc::new(Mutex::new(editor)),
        }
    }

    /// 生成弱引用，供长时间运行的摄取链路持有。
    pub fn downgrade(&self) -> WeakDocument<E> {
        WeakDocument {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// 只读访问编辑器。
    pub fn with_editor<T>(&self, read: impl FnOnce(&E) -> T) -> Result<T, ImageError> {
        let editor = self
            .inner
            .lock()
            .map_err(|_| ImageError::Document("文档锁已中毒".to_string()))?;
        Ok(read(&editor))
    }

    /// 当前文档值的快照。
    pub fn snapshot(&self) -> Result<DocumentValue, ImageError> {
        self.with_editor(|editor| editor.value().clone())
    }

    /// 将图片描述插入为新块。
    ///
    /// `position` 为空时追加到末尾；指定位置时，其后的块顺延一位。
    pub fn insert(
        &self,
        descriptor: ImageDescriptor,
        position: Option<u32>,
    ) -> Result<InsertedBlock, ImageError> {
        let mut editor = self
            .inner
            .lock()
            .map_err(|_| ImageError::Document("文档锁已中毒".to_string()))?;

        let current = editor.value();
        let next_order = match current.values().map(|block| block.meta.order).max() {
            None => 0,
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| ImageError::Document("块顺序号已达上限".to_string()))?,
        };
        let order = position.map_or(next_order, |position| position.min(next_order));

        let block_id = Uuid::new_v4().to_string();
        let element_id = Uuid::new_v4().to_string();
        let block = Block::image(block_id.clone(), element_id, &descriptor, order)?;

        let mut next = current.clone();
        if order < next_order {
            for existing in next.values_mut() {
                // 所有 order 都小于 next_order，+1 不会溢出
                if existing.meta.order >= order {
                    existing.meta.order += 1;
                }
            }
        }
        next.insert(block_id.clone(), block);

        editor.set_value(next);

        log::info!("🧱 已插入图片块 - id: {} order: {}", block_id, order);

        Ok(InsertedBlock { block_id, order })
    }
}

/// 文档句柄（弱引用）。
pub struct WeakDocument<E: Editor = MemoryEditor> {
    inner: Weak<Mutex<E>>,
}

impl<E: Editor> Clone for WeakDocument<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<E: Editor> WeakDocument<E> {
    pub fn upgrade(&self) -> Option<DocumentHandle<E>> {
        self.inner.upgrade().map(|inner| DocumentHandle { inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// 文档仍存活时插入，否则返回 `DocumentClosed`。
    pub fn insert(
        &self,
        descriptor: ImageDescriptor,
        position: Option<u32>,
    ) -> Result<InsertedBlock, ImageError> {
        let document = self.upgrade().ok_or_else(|| {
            log::warn!("⚠️ 文档已销毁，丢弃图片：{}", descriptor.src());
            ImageError::DocumentClosed
        })?;
        document.insert(descriptor, position)
    }
}
