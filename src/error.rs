//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 进程级错误统一为 `AppError`，由服务启动流程返回，`main` 记录后以非零码退出。
//! HTTP 请求级错误见 `upload::UploadError`，摄取链路错误见 `image_handler::ImageError`
//! （摄取链路的错误由调用方记录日志，不会上升为进程级错误）。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` 提供 `From` 转换，无需手动 map。

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 配置文件或环境变量无效
    #[error("配置错误: {0}")]
    Config(String),

    /// 文件系统 / 网络 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 上传存储目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),
}
