use crate::config::ServerConfig;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// DXF 图层过滤服务
#[derive(Debug, Parser)]
#[command(name = "dxfilter")]
#[command(about = "DXFilter: upload a DXF drawing, pick layers, download the filtered copy", long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "DXFILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Maximum request body and remote download size in bytes.
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Maximum number of drawings kept in memory.
    #[arg(long)]
    pub max_stored_files: Option<usize>,

    /// Seconds a stored drawing stays available.
    #[arg(long)]
    pub file_ttl_secs: Option<u64>,
}

impl Cli {
    /// 合并配置文件与命令行参数
    pub fn into_config(self) -> Result<ServerConfig> {
        let mut cfg = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(host) = self.host {
            cfg.host = host;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(bytes) = self.max_upload_bytes {
            cfg.max_upload_bytes = bytes;
        }
        if let Some(n) = self.max_stored_files {
            cfg.max_stored_files = n;
        }
        if let Some(secs) = self.file_ttl_secs {
            cfg.file_ttl_secs = secs;
        }
        Ok(cfg)
    }
}
