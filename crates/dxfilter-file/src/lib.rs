//! DXFilter 文件处理
//!
//! 支持：
//! - `.dxf` 解析（ASCII 与二进制）与序列化
//! - 图层列表与统计
//! - 按图层过滤生成新图纸
//! - 预览实体、测量报表与拉伸实体

pub mod document;
pub mod dxf_io;
pub mod error;
pub mod report;
pub mod solid;
pub mod viewer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use document::DrawingDocument;
pub use dxf_io::{DrawingEntity, FilterOutcome, Shape};
pub use error::FileError;
pub use report::LayerReport;
pub use solid::{ExtrusionRequest, SolidGeometry};
pub use viewer::ViewerEntity;
