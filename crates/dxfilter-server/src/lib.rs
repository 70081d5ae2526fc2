//! DXFilter HTTP 服务
//!
//! 上传 DXF 文件（或从远程地址获取），列出图层，按图层过滤并下载新文件。
//! 另提供预览实体、测量报表与拉伸实体接口。

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod routes;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, SharedState};
