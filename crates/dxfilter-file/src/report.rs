//! 图层测量报表
//!
//! 长度、面积按图纸单位（毫米）累计，输出时换算到请求的单位。

use crate::dxf_io::{DrawingEntity, Shape};
use dxfilter_core::geometry::{line_length, Arc, Circle, Ellipse};
use dxfilter_core::math::{round_to, Point2, Point3};
use dxfilter_core::units::ReportUnit;
use serde::Serialize;

/// 单个实体的测量值
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurement {
    pub length: f64,
    pub area: f64,
}

impl Measurement {
    pub fn is_positive(&self) -> bool {
        self.length > 0.0 || self.area > 0.0
    }
}

fn xy(p: &Point3) -> Point2 {
    Point2::new(p.x, p.y)
}

/// 测量实体几何，无法测量的类型返回零
pub fn measure(shape: &Shape) -> Measurement {
    match shape {
        Shape::Line { start, end } => Measurement {
            length: line_length(start, end),
            area: 0.0,
        },
        Shape::Polyline { .. } => match shape.as_polyline() {
            Some(polyline) if polyline.vertices.len() > 1 => Measurement {
                length: polyline.length(),
                area: polyline.area(),
            },
            _ => Measurement::default(),
        },
        Shape::Circle { center, radius } => {
            let circle = Circle::new(xy(center), *radius);
            Measurement {
                length: circle.circumference(),
                area: circle.area(),
            }
        }
        Shape::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => Measurement {
            length: Arc::from_degrees(xy(center), *radius, *start_angle, *end_angle).length(),
            area: 0.0,
        },
        Shape::Ellipse {
            center,
            major_axis,
            ratio,
        } => {
            let ellipse = Ellipse::from_axis(xy(center), major_axis, *ratio);
            Measurement {
                length: ellipse.circumference(),
                area: ellipse.area(),
            }
        }
        Shape::Spline { .. } | Shape::Unsupported => Measurement::default(),
    }
}

/// 图层累计值（图纸单位）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct LayerTotals {
    entity_count: usize,
    total_length: f64,
    total_area: f64,
    max_length: f64,
    max_area: f64,
}

impl LayerTotals {
    fn add(&mut self, m: Measurement) {
        self.entity_count += 1;
        self.total_length += m.length;
        self.total_area += m.area;
        self.max_length = self.max_length.max(m.length);
        self.max_area = self.max_area.max(m.area);
    }
}

/// 报表中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerReport {
    pub layer: String,
    pub entity_count: usize,
    pub total_length: f64,
    pub total_area: f64,
    pub max_length: f64,
    pub max_area: f64,
    pub raw_total_length: f64,
    pub raw_total_area: f64,
    pub raw_max_length: f64,
    pub raw_max_area: f64,
}

impl LayerReport {
    fn new(layer: String, totals: &LayerTotals, unit: ReportUnit) -> Self {
        let length = |v: f64| round_to(v * unit.length_factor(), 3);
        let area = |v: f64| round_to(v * unit.area_factor(), 3);
        Self {
            layer,
            entity_count: totals.entity_count,
            total_length: length(totals.total_length),
            total_area: area(totals.total_area),
            max_length: length(totals.max_length),
            max_area: area(totals.max_area),
            raw_total_length: round_to(totals.total_length, 3),
            raw_total_area: round_to(totals.total_area, 3),
            raw_max_length: round_to(totals.max_length, 3),
            raw_max_area: round_to(totals.max_area, 3),
        }
    }
}

/// 生成报表，按选择顺序输出，重复的图层名只出现一次
pub fn build_report(
    entities: &[DrawingEntity],
    selected: &[String],
    unit: ReportUnit,
) -> Vec<LayerReport> {
    let mut layers: Vec<(&str, LayerTotals)> = Vec::new();
    for name in selected {
        if !layers.iter().any(|(n, _)| *n == name.as_str()) {
            layers.push((name.as_str(), LayerTotals::default()));
        }
    }

    for entity in entities {
        let Some((_, totals)) = layers.iter_mut().find(|(n, _)| *n == entity.layer) else {
            continue;
        };
        let m = measure(&entity.shape);
        if m.is_positive() {
            totals.add(m);
        }
    }

    layers
        .into_iter()
        .map(|(name, totals)| LayerReport::new(name.to_string(), &totals, unit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dxf_io::convert_model_space;
    use crate::fixtures;
    use dxfilter_core::math::Vector3;
    use std::f64::consts::PI;

    fn sample_report(selected: &[&str], unit: ReportUnit) -> Vec<LayerReport> {
        let entities = convert_model_space(&fixtures::sample_drawing());
        let selected: Vec<String> = selected.iter().map(|s| s.to_string()).collect();
        build_report(&entities, &selected, unit)
    }

    #[test]
    fn test_measure_shapes() {
        let line = Shape::Line {
            start: Point3::new(0.0, 0.0, 0.0),
            end: Point3::new(3.0, 4.0, 12.0),
        };
        assert!((measure(&line).length - 13.0).abs() < 1e-12);

        let arc = Shape::Arc {
            center: Point3::origin(),
            radius: 2.0,
            start_angle: 270.0,
            end_angle: 0.0,
        };
        assert!((measure(&arc).length - PI).abs() < 1e-12);

        let circle_as_ellipse = Shape::Ellipse {
            center: Point3::origin(),
            major_axis: Vector3::new(5.0, 0.0, 0.0),
            ratio: 1.0,
        };
        let m = measure(&circle_as_ellipse);
        assert!((m.length - 10.0 * PI).abs() < 1e-9);
        assert!((m.area - 25.0 * PI).abs() < 1e-9);

        let open = Shape::Polyline {
            points: vec![Point3::origin(), Point3::new(10.0, 0.0, 0.0), Point3::new(10.0, 10.0, 0.0)],
            bulges: vec![0.0; 3],
            closed: false,
        };
        assert_eq!(measure(&open), Measurement { length: 20.0, area: 0.0 });

        assert!(!measure(&Shape::Unsupported).is_positive());
    }

    #[test]
    fn test_report_in_millimetres() {
        let report = sample_report(&["WALLS"], ReportUnit::Mm);
        assert_eq!(report.len(), 1);
        let walls = &report[0];
        assert_eq!(walls.layer, "WALLS");
        assert_eq!(walls.entity_count, 3);

        // 直线 50 + 正方形 400 + 圆 20π
        let expected_length = round_to(450.0 + 20.0 * PI, 3);
        assert_eq!(walls.total_length, expected_length);
        assert_eq!(walls.max_length, 400.0);
        assert_eq!(walls.max_area, 10_000.0);
        assert_eq!(walls.total_area, round_to(10_000.0 + 100.0 * PI, 3));
        assert_eq!(walls.raw_total_length, walls.total_length);
    }

    #[test]
    fn test_report_unit_conversion() {
        let report = sample_report(&["WALLS"], ReportUnit::Cm);
        let walls = &report[0];
        assert_eq!(walls.max_length, 40.0);
        assert_eq!(walls.max_area, 100.0);
        assert_eq!(walls.raw_max_length, 400.0);
        assert_eq!(walls.raw_max_area, 10_000.0);

        let report = sample_report(&["WALLS"], ReportUnit::M);
        assert_eq!(report[0].max_length, 0.4);
        assert_eq!(report[0].max_area, 0.01);
    }

    #[test]
    fn test_report_order_and_unmeasured() {
        let report = sample_report(&["EMPTY", "DOORS", "EMPTY", "MISSING"], ReportUnit::Mm);
        let names: Vec<&str> = report.iter().map(|r| r.layer.as_str()).collect();
        assert_eq!(names, ["EMPTY", "DOORS", "MISSING"]);

        // 块参照无法测量，只统计圆弧
        let doors = &report[1];
        assert_eq!(doors.entity_count, 1);
        assert_eq!(doors.total_length, round_to(5.0 * PI, 3));
        assert_eq!(report[0].entity_count, 0);
        assert_eq!(report[2].total_area, 0.0);
    }
}
