//! 服务端配置
//!
//! 读取顺序：默认值 → 可选 JSON 配置文件（`IMAGE_INGEST_SETTINGS`）→ 环境变量覆盖。
//! 公开 URL 前缀按 `VERCEL_URL` → `NEXT_PUBLIC_SITE_URL` → `http://localhost:3000` 解析。

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const SETTINGS_PATH_ENV: &str = "IMAGE_INGEST_SETTINGS";
pub const BIND_ENV: &str = "IMAGE_INGEST_BIND";
pub const UPLOAD_DIR_ENV: &str = "IMAGE_INGEST_UPLOAD_DIR";
pub const MAX_BODY_BYTES_ENV: &str = "IMAGE_INGEST_MAX_BODY_BYTES";
pub const DEPLOYMENT_HOST_ENV: &str = "VERCEL_URL";
pub const SITE_URL_ENV: &str = "NEXT_PUBLIC_SITE_URL";

pub const LOCAL_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub upload_dir: PathBuf,
    pub max_body_bytes: usize,
    /// 部署平台提供的主机名（不含协议）。
    pub deployment_host: Option<String>,
    pub site_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            upload_dir: PathBuf::from("public/uploads"),
            max_body_bytes: 50 * 1024 * 1024,
            deployment_host: None,
            site_url: None,
        }
    }
}

impl ServerSettings {
    /// 从进程环境加载。
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意键值查找函数加载，便于测试。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let base = match non_empty(lookup(SETTINGS_PATH_ENV)) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(lookup)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        let settings = serde_json::from_str::<Self>(&content)
            .map_err(|e| AppError::Config(format!("解析设置文件 '{}' 失败: {}", path.display(), e)))?;
        log::info!("⚙️ 已加载设置文件: {}", path.display());
        Ok(settings)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        if let Some(bind) = non_empty(lookup(BIND_ENV)) {
            self.bind = bind;
        }
        if let Some(dir) = non_empty(lookup(UPLOAD_DIR_ENV)) {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(limit) = non_empty(lookup(MAX_BODY_BYTES_ENV)) {
            self.max_body_bytes = limit
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("{} 不是有效的字节数: {}", MAX_BODY_BYTES_ENV, e)))?;
        }
        if let Some(host) = non_empty(lookup(DEPLOYMENT_HOST_ENV)) {
            self.deployment_host = Some(host);
        }
        if let Some(url) = non_empty(lookup(SITE_URL_ENV)) {
            self.site_url = Some(url);
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        self.bind
            .parse()
            .map_err(|e| AppError::Config(format!("监听地址 '{}' 无效: {}", self.bind, e)))
    }

    /// 上传文件绝对 URL 的前缀（不带结尾 `/`）。
    pub fn base_url(&self) -> String {
        resolve_base_url(self.deployment_host.as_deref(), self.site_url.as_deref())
    }
}

pub fn resolve_base_url(deployment_host: Option<&str>, site_url: Option<&str>) -> String {
    if let Some(host) = deployment_host.map(str::trim).filter(|h| !h.is_empty()) {
        return format!("https://{}", host.trim_end_matches('/'));
    }
    if let Some(url) = site_url.map(str::trim).filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }
    LOCAL_BASE_URL.to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn base_url_prefers_deployment_host_then_site_url() {
        assert_eq!(resolve_base_url(Some("app.vercel.app"), Some("https://site.test")), "https://app.vercel.app");
        assert_eq!(resolve_base_url(None, Some("https://site.test/")), "https://site.test");
        assert_eq!(resolve_base_url(Some(""), None), "http://localhost:3000");
    }

    #[test]
    fn env_overrides_defaults() {
        let settings = ServerSettings::from_lookup(lookup(&[
            (BIND_ENV, "127.0.0.1:8080"),
            (UPLOAD_DIR_ENV, "/tmp/uploads"),
            (MAX_BODY_BYTES_ENV, "1024"),
            (SITE_URL_ENV, "https://docs.test"),
        ]))
        .expect("settings");

        assert_eq!(settings.bind_addr().expect("addr").port(), 8080);
        assert_eq!(settings.upload_dir, PathBuf::from("/tmp/uploads"));
        assert_eq!(settings.max_body_bytes, 1024);
        assert_eq!(settings.base_url(), "https://docs.test");
    }

    #[test]
    fn invalid_body_limit_is_a_config_error() {
        let result = ServerSettings::from_lookup(lookup(&[(MAX_BODY_BYTES_ENV, "lots")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn settings_file_is_read_before_env_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"bind":"127.0.0.1:4000","upload_dir":"files"}"#).expect("write settings");

        let path_str = path.to_string_lossy().to_string();
        let settings = ServerSettings::from_lookup(lookup(&[
            (SETTINGS_PATH_ENV, path_str.as_str()),
            (BIND_ENV, "127.0.0.1:5000"),
        ]))
        .expect("settings");

        assert_eq!(settings.bind, "127.0.0.1:5000");
        assert_eq!(settings.upload_dir, PathBuf::from("files"));
        assert_eq!(settings.max_body_bytes, 50 * 1024 * 1024);
    }
}
