//! 拉伸实体
//!
//! 从轮廓图层提取闭合轮廓并拉伸为三角网格。指定切割图层时，先合并
//! 所有切割轮廓，再从每个轮廓中减去；求差得到的每个区域（可带孔洞）
//! 单独拉伸，共享同一个 `contour_index`。

use crate::dxf_io::{DrawingEntity, Shape};
use dxfilter_core::boolean::subtract;
use dxfilter_core::geometry::{Circle, Contour, CIRCLE_SEGMENTS};
use dxfilter_core::math::Point2;
use dxfilter_core::mesh::{extrude_with_holes, Mesh};
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

fn default_operation_name() -> String {
    "Extrusion".to_string()
}

fn default_operation_color() -> String {
    "#4CAF50".to_string()
}

fn default_height() -> f64 {
    100.0
}

/// 数值字段同时接受数字与数字字符串
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(v) => Ok(v),
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// 一次拉伸操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionRequest {
    #[serde(default = "default_operation_name")]
    pub operation_name: String,
    #[serde(default = "default_operation_color")]
    pub operation_color: String,
    pub contour_layer: String,
    #[serde(default)]
    pub cut_layer: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub z_offset: f64,
    #[serde(default = "default_height", deserialize_with = "lenient_f64")]
    pub height: f64,
}

impl ExtrusionRequest {
    pub fn new(contour_layer: impl Into<String>) -> Self {
        Self {
            operation_name: default_operation_name(),
            operation_color: default_operation_color(),
            contour_layer: contour_layer.into(),
            cut_layer: None,
            z_offset: 0.0,
            height: default_height(),
        }
    }

    /// 切割图层，空字符串视为未指定
    pub fn cut_layer(&self) -> Option<&str> {
        self.cut_layer.as_deref().filter(|s| !s.is_empty())
    }
}

/// 单个轮廓的拉伸结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolidGeometry {
    pub operation_name: String,
    pub operation_color: String,
    pub contour_layer: String,
    pub contour_index: usize,
    pub cut_layer: Option<String>,
    pub z_offset: f64,
    pub height: f64,
    pub volume: f64,
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[usize; 3]>,
    pub vertex_count: usize,
    pub face_count: usize,
}

impl SolidGeometry {
    fn new(request: &ExtrusionRequest, contour_index: usize, mesh: Mesh, volume: f64) -> Self {
        Self {
            operation_name: request.operation_name.clone(),
            operation_color: request.operation_color.clone(),
            contour_layer: request.contour_layer.clone(),
            contour_index,
            cut_layer: request.cut_layer().map(str::to_string),
            z_offset: request.z_offset,
            height: request.height,
            volume,
            vertex_count: mesh.vertex_count(),
            face_count: mesh.face_count(),
            vertices: mesh.vertices,
            faces: mesh.faces,
        }
    }
}

/// 实体的闭合轮廓：多段线与圆
pub fn shape_contour(shape: &Shape) -> Option<Contour> {
    match shape {
        Shape::Polyline { .. } => shape.as_polyline()?.to_contour(),
        Shape::Circle { center, radius } => {
            let circle = Circle::new(Point2::new(center.x, center.y), *radius);
            Contour::from_circle(&circle, CIRCLE_SEGMENTS)
        }
        _ => None,
    }
}

/// 图层上的所有闭合轮廓，按实体顺序
pub fn contours_on_layer(entities: &[DrawingEntity], layer: &str) -> Vec<Contour> {
    entities
        .iter()
        .filter(|e| e.layer == layer)
        .filter_map(|e| shape_contour(&e.shape))
        .collect()
}

fn extrude_contour(
    request: &ExtrusionRequest,
    index: usize,
    contour: &Contour,
    cuts: &[Contour],
) -> Vec<SolidGeometry> {
    let (z, h) = (request.z_offset, request.height);
    if cuts.is_empty() {
        let mesh = extrude_with_holes(contour, &[], z, h);
        return vec![SolidGeometry::new(request, index, mesh, contour.area() * h)];
    }

    let regions = subtract(contour, cuts);
    if regions.is_empty() {
        debug!(index, "contour fully removed by cut");
    }
    regions
        .iter()
        .map(|region| {
            let mesh = extrude_with_holes(&region.outer, &region.holes, z, h);
            SolidGeometry::new(request, index, mesh, region.area() * h)
        })
        .collect()
}

/// 执行一次拉伸操作
pub fn build_solids(entities: &[DrawingEntity], request: &ExtrusionRequest) -> Vec<SolidGeometry> {
    let contours = contours_on_layer(entities, &request.contour_layer);
    let cuts = request
        .cut_layer()
        .map(|layer| contours_on_layer(entities, layer))
        .unwrap_or_default();
    debug!(
        layer = %request.contour_layer,
        contours = contours.len(),
        cuts = cuts.len(),
        "building solids"
    );

    let per_contour: Vec<Vec<SolidGeometry>> = contours
        .par_iter()
        .enumerate()
        .map(|(index, contour)| extrude_contour(request, index, contour, &cuts))
        .collect();
    per_contour.into_iter().flatten().collect()
}

/// 执行多个拉伸操作，结果按请求顺序拼接
pub fn build_all(entities: &[DrawingEntity], requests: &[ExtrusionRequest]) -> Vec<SolidGeometry> {
    requests
        .iter()
        .flat_map(|request| build_solids(entities, request))
        .collect()
}
