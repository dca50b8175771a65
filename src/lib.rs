//! # 编辑器图片摄取 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              宿主富文本编辑器（外部协作方）               │
//! │        paste / drop 事件        Editor::set_value        │
//! └───────┬──────────────────────────────────▲───────────────┘
//!         ↓                                  │
//! ┌───────┼──────────────────────────────────┼───────────────┐
//! │       ↓          摄取链路 (Rust)          │               │
//! │  image_handler ── IngestService ── ImageHandler          │
//! │   ├─ normalizer / extractor   候选选择 + preventDefault   │
//! │   ├─ uploader                 multipart 上传              │
//! │   │   └─ fallback             Data URL + 真实尺寸         │
//! │   └─ document                 块插入（串行化 order）      │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ POST /api/upload-image
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  upload ── axum 路由 ── storage (UploadStore)             │
//! │  settings  监听地址 / 上传目录 / 公开 URL 解析             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 进程级错误类型 `AppError` |
//! | [`settings`] | `ServerSettings`：JSON 文件 + 环境变量，公开 URL 解析 |
//! | [`storage`] | 上传目录、唯一存储名、扩展名推导 |
//! | [`upload`] | `POST /api/upload-image` 与 `/uploads` 静态服务 |
//! | [`image_handler`] | 输入规范化、上传与本地回退、编排与服务入口 |
//! | [`document`] | 块记录结构与插入桥（`DocumentHandle` / `WeakDocument`） |

pub mod document;
pub mod error;
pub mod image_handler;
pub mod settings;
pub mod storage;
pub mod upload;
