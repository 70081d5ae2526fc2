//! DXFilter 几何核心
//!
//! 提供图层过滤服务所需的纯几何计算，不依赖任何文件格式。
//!
//! # 模块
//!
//! - `math`: 点/向量别名与容差
//! - `properties`: AutoCAD 颜色索引 (ACI)
//! - `units`: 报表单位换算
//! - `layer`: 实体类型与图层统计
//! - `geometry`: 轮廓提取与长度/面积测量
//! - `boolean`: 切割轮廓的合并与求差
//! - `mesh`: 三角剖分与拉伸网格
//!
//! # 示例
//!
//! ```rust
//! use dxfilter_core::prelude::*;
//!
//! let square = Contour::new(vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(10.0, 0.0),
//!     Point2::new(10.0, 10.0),
//!     Point2::new(0.0, 10.0),
//! ])
//! .unwrap();
//!
//! let mesh = extrude_with_holes(&square, &[], 0.0, 5.0);
//! assert_eq!(mesh.vertices.len(), 8);
//! assert!((square.area() * 5.0 - 500.0).abs() < 1e-9);
//! ```

pub mod boolean;
pub mod geometry;
pub mod layer;
pub mod math;
pub mod mesh;
pub mod properties;
pub mod units;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::boolean::{subtract, Region};
    pub use crate::geometry::Contour;
    pub use crate::layer::{sort_by_name, EntityKind, LayerStatistics, LayerStats, LayerSummary};
    pub use crate::math::{Point2, Point3, Vector2, Vector3};
    pub use crate::mesh::{extrude_with_holes, simple_extrusion, triangulate, Mesh, MeshError};
    pub use crate::properties::AciColor;
    pub use crate::units::ReportUnit;
}
