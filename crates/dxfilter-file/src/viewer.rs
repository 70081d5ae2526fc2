//! 预览实体
//!
//! 浏览器端绘制所需的最小几何数据。

use crate::dxf_io::{DrawingEntity, Shape};
use dxfilter_core::math::{Point3, Vector3};
use dxfilter_core::properties::AciColor;
use serde::Serialize;

/// 预览实体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerEntity {
    #[serde(rename = "type")]
    pub entity_type: &'static str,
    pub layer: String,
    pub color: AciColor,
    /// 调色板颜色的 `#rrggbb`，ByLayer/ByBlock 时省略
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    #[serde(flatten)]
    pub shape: Option<ViewerShape>,
}

/// 几何数据，坐标为 `[x, y, z]`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewerShape {
    Line {
        start: [f64; 3],
        end: [f64; 3],
    },
    Polyline {
        points: Vec<[f64; 3]>,
        closed: bool,
    },
    Arc {
        center: [f64; 3],
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Circle {
        center: [f64; 3],
        radius: f64,
    },
    Ellipse {
        center: [f64; 3],
        major_axis: [f64; 3],
        ratio: f64,
    },
    Spline {
        control_points: Vec<[f64; 3]>,
    },
}

fn xyz(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn vec_xyz(v: &Vector3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

impl ViewerShape {
    pub fn from_shape(shape: &Shape) -> Option<Self> {
        let shape = match shape {
            Shape::Line { start, end } => ViewerShape::Line {
                start: xyz(start),
                end: xyz(end),
            },
            Shape::Polyline { points, closed, .. } => ViewerShape::Polyline {
                points: points.iter().map(xyz).collect(),
                closed: *closed,
            },
            Shape::Circle { center, radius } => ViewerShape::Circle {
                center: xyz(center),
                radius: *radius,
            },
            Shape::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => ViewerShape::Arc {
                center: xyz(center),
                radius: *radius,
                start_angle: *start_angle,
                end_angle: *end_angle,
            },
            Shape::Ellipse {
                center,
                major_axis,
                ratio,
            } => ViewerShape::Ellipse {
                center: xyz(center),
                major_axis: vec_xyz(major_axis),
                ratio: *ratio,
            },
            Shape::Spline { control_points } => ViewerShape::Spline {
                control_points: control_points.iter().map(xyz).collect(),
            },
            Shape::Unsupported => return None,
        };
        Some(shape)
    }
}

impl From<&DrawingEntity> for ViewerEntity {
    fn from(entity: &DrawingEntity) -> Self {
        Self {
            entity_type: entity.type_name,
            layer: entity.layer.clone(),
            color: entity.color,
            hex: (!entity.color.is_by_layer() && !entity.color.is_by_block())
                .then(|| entity.color.to_hex()),
            shape: ViewerShape::from_shape(&entity.shape),
        }
    }
}

/// 选中图层上的预览实体
pub fn viewer_entities(entities: &[DrawingEntity], selected: &[String]) -> Vec<ViewerEntity> {
    entities
        .iter()
        .filter(|e| selected.iter().any(|name| *name == e.layer))
        .map(ViewerEntity::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dxf_io::convert_model_space;
    use crate::fixtures;
    use serde_json::json;

    #[test]
    fn test_only_selected_layers() {
        let entities = convert_model_space(&fixtures::sample_drawing());
        let viewer = viewer_entities(&entities, &["DOORS".to_string()]);
        assert_eq!(viewer.len(), 2);
        assert!(viewer.iter().all(|e| e.layer == "DOORS"));
    }

    #[test]
    fn test_serialized_shapes() {
        let entities = convert_model_space(&fixtures::sample_drawing());
        let viewer = viewer_entities(&entities, &["WALLS".to_string(), "DOORS".to_string()]);
        let value = serde_json::to_value(&viewer).unwrap();

        assert_eq!(
            value[0],
            json!({
                "type": "LINE",
                "layer": "WALLS",
                "color": 256,
                "start": [0.0, 0.0, 0.0],
                "end": [30.0, 40.0, 0.0],
            })
        );
        assert_eq!(value[1]["closed"], json!(true));
        assert_eq!(value[1]["points"].as_array().unwrap().len(), 4);
        assert_eq!(value[2]["radius"], json!(10.0));
        assert_eq!(value[3]["type"], json!("ARC"));
        assert_eq!(value[3]["end_angle"], json!(90.0));
        assert_eq!(value[4], json!({"type": "INSERT", "layer": "DOORS", "color": 256}));
    }

    #[test]
    fn test_palette_color_carries_hex() {
        let mut entities = convert_model_space(&fixtures::sample_drawing());
        entities[0].color = AciColor::RED;
        let viewer = viewer_entities(&entities, &["WALLS".to_string()]);

        assert_eq!(viewer[0].hex.as_deref(), Some("#ff0000"));
        assert_eq!(viewer[1].hex, None);
        let value = serde_json::to_value(&viewer[0]).unwrap();
        assert_eq!(value["hex"], json!("#ff0000"));
    }
}
