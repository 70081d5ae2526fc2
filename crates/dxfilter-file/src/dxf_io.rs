//! DXF文件读写与图层过滤
//!
//! 基于 `dxf` crate：
//! - 从内存字节解析图纸（ASCII 与二进制）
//! - 图层列表与实体统计
//! - 按图层生成过滤后的新图纸

use crate::error::FileError;
use dxf::entities::{Entity, EntityType};
use dxf::tables::Layer;
use dxf::{Color, Drawing, Handle};
use dxfilter_core::geometry::{Polyline, PolylineVertex};
use dxfilter_core::layer::{sort_by_name, EntityKind, LayerStatistics, LayerSummary};
use dxfilter_core::math::{Point2, Point3, Vector3};
use dxfilter_core::properties::AciColor;
use std::collections::HashSet;
use std::io::Cursor;
use tracing::{debug, info, warn};

/// 从字节加载图纸
pub fn load_bytes(bytes: &[u8]) -> Result<Drawing, FileError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(FileError::InvalidFormat("file is empty".to_string()));
    }
    let mut cursor = Cursor::new(bytes);
    let drawing = Drawing::load(&mut cursor)?;
    debug!(
        version = ?drawing.header.version,
        layers = drawing.layers().count(),
        entities = drawing.entities().count(),
        "drawing loaded"
    );
    Ok(drawing)
}

/// 将图纸序列化为 ASCII DXF
pub fn save_bytes(drawing: &Drawing) -> Result<Vec<u8>, FileError> {
    let mut buf = Vec::new();
    drawing.save(&mut buf)?;
    Ok(buf)
}

/// 模型空间实体
pub fn model_space(drawing: &Drawing) -> impl Iterator<Item = &Entity> {
    drawing.entities().filter(|e| !e.common.is_in_paper_space)
}

/// DXF 实体类型名
pub fn type_name(specific: &EntityType) -> &'static str {
    match specific {
        EntityType::Face3D(_) => "3DFACE",
        EntityType::Solid3D(_) => "3DSOLID",
        EntityType::ProxyEntity(_) => "ACAD_PROXY_ENTITY",
        EntityType::Arc(_) => "ARC",
        EntityType::ArcAlignedText(_) => "ARCALIGNEDTEXT",
        EntityType::AttributeDefinition(_) => "ATTDEF",
        EntityType::Attribute(_) => "ATTRIB",
        EntityType::Body(_) => "BODY",
        EntityType::Circle(_) => "CIRCLE",
        EntityType::RotatedDimension(_)
        | EntityType::RadialDimension(_)
        | EntityType::DiameterDimension(_)
        | EntityType::AngularThreePointDimension(_)
        | EntityType::OrdinateDimension(_) => "DIMENSION",
        EntityType::Ellipse(_) => "ELLIPSE",
        EntityType::Helix(_) => "HELIX",
        EntityType::Image(_) => "IMAGE",
        EntityType::Insert(_) => "INSERT",
        EntityType::Leader(_) => "LEADER",
        EntityType::Light(_) => "LIGHT",
        EntityType::Line(_) => "LINE",
        EntityType::LwPolyline(_) => "LWPOLYLINE",
        EntityType::MLine(_) => "MLINE",
        EntityType::MText(_) => "MTEXT",
        EntityType::OleFrame(_) => "OLEFRAME",
        EntityType::Ole2Frame(_) => "OLE2FRAME",
        EntityType::ModelPoint(_) => "POINT",
        EntityType::Polyline(_) => "POLYLINE",
        EntityType::Ray(_) => "RAY",
        EntityType::Region(_) => "REGION",
        EntityType::RText(_) => "RTEXT",
        EntityType::Section(_) => "SECTION",
        EntityType::Seqend(_) => "SEQEND",
        EntityType::Shape(_) => "SHAPE",
        EntityType::Solid(_) => "SOLID",
        EntityType::Spline(_) => "SPLINE",
        EntityType::Text(_) => "TEXT",
        EntityType::Tolerance(_) => "TOLERANCE",
        EntityType::Trace(_) => "TRACE",
        EntityType::DgnUnderlay(_) => "DGNUNDERLAY",
        EntityType::DwfUnderlay(_) => "DWFUNDERLAY",
        EntityType::PdfUnderlay(_) => "PDFUNDERLAY",
        EntityType::Vertex(_) => "VERTEX",
        EntityType::Wipeout(_) => "WIPEOUT",
        EntityType::XLine(_) => "XLINE",
    }
}

/// 图层颜色，未设置时视为白色
fn layer_color(layer: &Layer) -> AciColor {
    AciColor::from_index(layer.color.index().map(i32::from).unwrap_or(7))
}

/// 实体颜色：ByBlock 为 0，ByLayer 及其他非索引值为 256
fn entity_color(color: &Color) -> AciColor {
    if color.is_by_block() {
        return AciColor::BY_BLOCK;
    }
    color
        .index()
        .map(|i| AciColor(u16::from(i)))
        .unwrap_or(AciColor::BY_LAYER)
}

/// 复制图层的显示状态（颜色、线型、开关、打印、线宽）
fn copy_layer_state(target: &mut Layer, source: &Layer) {
    target.color = source.color.clone();
    target.line_type_name = source.line_type_name.clone();
    target.is_layer_on = source.is_layer_on;
    target.is_layer_plotted = source.is_layer_plotted;
    target.line_weight = source.line_weight.clone();
}

/// 列出图层，按名称排序
pub fn list_layers(drawing: &Drawing) -> Vec<LayerSummary> {
    let mut statistics = LayerStatistics::new();
    for entity in model_space(drawing) {
        let kind = EntityKind::from_dxf_type(type_name(&entity.specific));
        statistics.record(&entity.common.layer, kind);
    }

    let mut layers: Vec<LayerSummary> = drawing
        .layers()
        .map(|layer| {
            LayerSummary::new(
                layer.name.clone(),
                layer_color(layer),
                layer.is_layer_on,
                layer.line_type_name.clone(),
                &statistics.get(&layer.name),
            )
        })
        .collect();
    sort_by_name(&mut layers);
    layers
}

/// 图层过滤结果
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// 新图纸的 DXF 字节
    pub bytes: Vec<u8>,
    /// 复制的图层数
    pub layer_count: usize,
    /// 复制的实体数
    pub entity_count: usize,
}

impl FilterOutcome {
    pub fn message(&self) -> String {
        format!(
            "File created with {} layers and {} objects",
            self.layer_count, self.entity_count
        )
    }
}

/// 按图层过滤，返回新图纸
///
/// 新图纸沿用源文件的 DXF 版本，只包含选中的图层、这些图层引用的线型、
/// 选中图层上的模型空间实体以及被复制的块参照所需的块定义。
pub fn filter_layers(source: &Drawing, selected: &[String]) -> Result<FilterOutcome, FileError> {
    if selected.is_empty() {
        return Err(FileError::EmptySelection);
    }
    let selected: HashSet<&str> = selected.iter().map(String::as_str).collect();

    let mut output = Drawing::new();
    output.header.version = source.header.version;

    // 图层
    let mut layer_count = 0;
    let mut line_types: HashSet<String> = HashSet::new();
    for layer in source.layers().filter(|l| selected.contains(l.name.as_str())) {
        line_types.insert(layer.line_type_name.to_ascii_uppercase());
        layer_count += 1;
        let existing = output.layers_mut().find(|l| l.name == layer.name);
        if let Some(existing) = existing {
            debug!(layer = %layer.name, "layer already present in new drawing");
            copy_layer_state(existing, layer);
            continue;
        }
        let mut copy = Layer::default();
        copy.name = layer.name.clone();
        copy_layer_state(&mut copy, layer);
        output.add_layer(copy);
    }
    for name in &selected {
        if !source.layers().any(|l| l.name == *name) {
            warn!(layer = %name, "selected layer not found in drawing, skipping");
        }
    }

    // 线型
    for line_type in source.line_types() {
        let upper = line_type.name.to_ascii_uppercase();
        if !line_types.contains(&upper)
            || output.line_types().any(|lt| lt.name.eq_ignore_ascii_case(&line_type.name))
        {
            continue;
        }
        output.add_line_type(line_type.clone());
    }

    // 实体
    let mut entity_count = 0;
    let mut blocks: Vec<String> = Vec::new();
    for entity in model_space(source).filter(|e| selected.contains(e.common.layer.as_str())) {
        if let EntityType::Insert(insert) = &entity.specific {
            blocks.push(insert.name.clone());
        }
        let mut copy = entity.clone();
        copy.common.handle = Handle::empty();
        output.add_entity(copy);
        entity_count += 1;
    }

    copy_blocks(source, &mut output, blocks);

    let bytes = save_bytes(&output)?;
    info!(
        layers = layer_count,
        entities = entity_count,
        size = bytes.len(),
        "filtered drawing created"
    );
    Ok(FilterOutcome {
        bytes,
        layer_count,
        entity_count,
    })
}

/// 复制块定义，包括块内嵌套引用的块
fn copy_blocks(source: &Drawing, output: &mut Drawing, mut pending: Vec<String>) {
    let mut seen: HashSet<String> = HashSet::new();
    while let Some(name) = pending.pop() {
        if !seen.insert(name.clone()) || output.blocks().any(|b| b.name == name) {
            continue;
        }
        let Some(block) = source.blocks().find(|b| b.name == name) else {
            warn!(block = %name, "referenced block definition missing");
            continue;
        };

        let mut copy = block.clone();
        copy.handle = Handle::empty();
        for entity in copy.entities.iter_mut() {
            entity.common.handle = Handle::empty();
            if let EntityType::Insert(insert) = &entity.specific {
                pending.push(insert.name.clone());
            }
        }
        output.add_block(copy);
    }
}

/// 与 DXF 无关的实体几何
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line {
        start: Point3,
        end: Point3,
    },
    Polyline {
        points: Vec<Point3>,
        bulges: Vec<f64>,
        closed: bool,
    },
    Circle {
        center: Point3,
        radius: f64,
    },
    /// 角度单位为度
    Arc {
        center: Point3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Ellipse {
        center: Point3,
        major_axis: Vector3,
        ratio: f64,
    },
    Spline {
        control_points: Vec<Point3>,
    },
    Unsupported,
}

impl Shape {
    /// 多段线的二维表示
    pub fn as_polyline(&self) -> Option<Polyline> {
        match self {
            Shape::Polyline {
                points,
                bulges,
                closed,
            } => {
                let vertices = points
                    .iter()
                    .zip(bulges.iter())
                    .map(|(p, bulge)| PolylineVertex::with_bulge(Point2::new(p.x, p.y), *bulge))
                    .collect();
                Some(Polyline::new(vertices, *closed))
            }
            _ => None,
        }
    }
}

/// 已解析的模型空间实体
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingEntity {
    pub type_name: &'static str,
    pub kind: EntityKind,
    pub layer: String,
    pub color: AciColor,
    pub shape: Shape,
}

fn point3(p: &dxf::Point) -> Point3 {
    Point3::new(p.x, p.y, p.z)
}

/// 转换单个 DXF 实体
pub fn convert_entity(entity: &Entity) -> DrawingEntity {
    let shape = match &entity.specific {
        EntityType::Line(line) => Shape::Line {
            start: point3(&line.p1),
            end: point3(&line.p2),
        },
        EntityType::LwPolyline(lwpoly) => Shape::Polyline {
            points: lwpoly
                .vertices
                .iter()
                .map(|v| Point3::new(v.x, v.y, 0.0))
                .collect(),
            bulges: lwpoly.vertices.iter().map(|v| v.bulge).collect(),
            closed: lwpoly.is_closed(),
        },
        EntityType::Polyline(poly) => Shape::Polyline {
            points: poly.vertices().map(|v| point3(&v.location)).collect(),
            bulges: poly.vertices().map(|v| v.bulge).collect(),
            closed: poly.is_closed(),
        },
        EntityType::Circle(circle) => Shape::Circle {
            center: point3(&circle.center),
            radius: circle.radius,
        },
        EntityType::Arc(arc) => Shape::Arc {
            center: point3(&arc.center),
            radius: arc.radius,
            start_angle: arc.start_angle,
            end_angle: arc.end_angle,
        },
        EntityType::Ellipse(ellipse) => Shape::Ellipse {
            center: point3(&ellipse.center),
            major_axis: Vector3::new(
                ellipse.major_axis.x,
                ellipse.major_axis.y,
                ellipse.major_axis.z,
            ),
            ratio: ellipse.minor_axis_ratio,
        },
        EntityType::Spline(spline) => Shape::Spline {
            control_points: spline.control_points.iter().map(point3).collect(),
        },
        _ => Shape::Unsupported,
    };

    let type_name = type_name(&entity.specific);
    DrawingEntity {
        type_name,
        kind: EntityKind::from_dxf_type(type_name),
        layer: entity.common.layer.clone(),
        color: entity_color(&entity.common.color),
        shape,
    }
}

/// 转换所有模型空间实体
pub fn convert_model_space(drawing: &Drawing) -> Vec<DrawingEntity> {
    model_space(drawing).map(convert_entity).collect()
}
