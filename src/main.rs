//! # 图片上传服务 — 进程入口
//!
//! 本文件仅负责日志初始化、配置加载与服务启动。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use editor_image_ingest::error::AppError;
use editor_image_ingest::settings::ServerSettings;
use editor_image_ingest::upload::{self, UploadState};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("服务异常退出: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let settings = ServerSettings::load()?;
    let addr = settings.bind_addr()?;
    log::info!("setup: settings loaded, upload dir {}", settings.upload_dir.display());

    let state = UploadState::from_settings(&settings);
    state.store.ensure_dir().await?;
    log::info!("setup: upload dir ready, public base {}", state.base_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("setup: listening on {}", listener.local_addr()?);

    axum::serve(listener, upload::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("收到 Ctrl-C，开始优雅退出"),
        Err(err) => {
            log::warn!("注册 Ctrl-C 监听失败: {err}");
            std::future::pending::<()>().await;
        }
    }
}
