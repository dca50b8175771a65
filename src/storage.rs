//! 上传文件存储模块
//!
//! # 设计思路
//!
//! 统一管理上传图片的持久化路径。原始文件名只作为元数据返回，
//! 永远不参与存储路径的拼接，避免覆盖与路径穿越。
//!
//! # 实现思路
//!
//! - 扩展名取原始文件名最后一个 `.` 之后的部分，小写化；
//!   为空、非 ASCII 字母数字或过长时回退为 `png`。
//! - 存储名 = 随机 UUID v4 + 扩展名，重复上传同名文件也不会冲突。
//! - 写入前 `create_dir_all`，目录已存在时不报错（幂等）。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::AppError;

/// 无法从文件名得到扩展名时的默认值。
pub const DEFAULT_EXTENSION: &str = "png";
/// 对外暴露上传文件的 URL 前缀。
pub const PUBLIC_PREFIX: &str = "/uploads";

const MAX_EXTENSION_LEN: usize = 10;

/// 已落盘的文件信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub storage_name: String,
    pub extension: String,
    pub path: PathBuf,
    pub size: u64,
}

impl StoredFile {
    /// 站点内的公开路径，例如 `/uploads/<uuid>.png`。
    pub fn public_path(&self) -> String {
        format!("{}/{}", PUBLIC_PREFIX, self.storage_name)
    }
}

/// 上传目录
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 确保目录存在。
    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Storage(format!("创建上传目录 '{}' 失败: {}", self.dir.display(), e))
        })
    }

    /// 以唯一存储名写入文件，写入完成后才返回。
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, AppError> {
        self.ensure_dir().await?;

        let extension = derive_extension(original_name);
        let storage_name = storage_name(&extension);
        let path = self.dir.join(&storage_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("写入文件 '{}' 失败: {}", path.display(), e)))?;

        log::info!("💾 上传文件已保存: {} ({}B)", path.display(), bytes.len());

        Ok(StoredFile {
            storage_name,
            extension,
            path,
            size: bytes.len() as u64,
        })
    }
}

/// 从原始文件名推导扩展名。
pub fn derive_extension(original_name: &str) -> String {
    original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn storage_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}
