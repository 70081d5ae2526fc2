//! 服务配置
//!
//! 优先级（由低到高）：默认值、TOML 配置文件、命令行参数/环境变量。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 请求体与远程下载的大小上限（字节）
    pub max_upload_bytes: usize,
    /// 内存中最多保存的文件数，超出时淘汰最旧的
    pub max_stored_files: usize,
    /// 文件保存时长（秒）
    pub file_ttl_secs: u64,
    /// 远程下载超时（秒）
    pub fetch_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024,
            max_stored_files: 64,
            file_ttl_secs: 3600,
            fetch_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let cfg: ServerConfig = toml::from_str(&data)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn file_ttl(&self) -> Duration {
        Duration::from_secs(self.file_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.max_upload_bytes, 52_428_800);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
        assert_eq!(cfg.file_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn config_toml_partial() {
        let toml = r#"
            port = 9000
            max_stored_files = 4
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.max_stored_files, 4);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.fetch_timeout_secs, 30);
    }

    #[test]
    fn config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"127.0.0.1\"\nfile_ttl_secs = 60").unwrap();
        let cfg = ServerConfig::load(file.path()).unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.file_ttl_secs, 60);
        assert_eq!(cfg.port, 8000);
    }

    #[test]
    fn config_load_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert!(ServerConfig::load(file.path()).is_err());
        assert!(ServerConfig::load(Path::new("/nonexistent/dxfilter.toml")).is_err());
    }
}
