//! 几何图元与测量
//!
//! 支持：
//! - 线段、圆、圆弧、椭圆的长度/面积
//! - 多段线（含凸度弧段）的长度与面积
//! - 闭合轮廓 (Contour) 的提取与面积

use crate::math::{cross, Point2, Point3, Vector3, CLOSE_TOLERANCE, EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 圆离散化的默认分段数
pub const CIRCLE_SEGMENTS: usize = 32;

/// 3D线段长度
pub fn line_length(start: &Point3, end: &Point3) -> f64 {
    (end - start).norm()
}

/// 圆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// 计算周长
    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius
    }

    /// 计算面积
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    /// 获取圆上指定角度的点
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }
}

/// 圆弧
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    /// 起始角度（弧度）
    pub start_angle: f64,
    /// 终止角度（弧度）
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// DXF 中圆弧角度以度为单位
    pub fn from_degrees(center: Point2, radius: f64, start_deg: f64, end_deg: f64) -> Self {
        Self::new(center, radius, start_deg.to_radians(), end_deg.to_radians())
    }

    /// 计算扫过的角度（逆时针，负值加一整圈）
    pub fn sweep_angle(&self) -> f64 {
        let sweep = self.end_angle - self.start_angle;
        if sweep < 0.0 {
            sweep + 2.0 * PI
        } else {
            sweep
        }
    }

    /// 计算弧长
    pub fn length(&self) -> f64 {
        self.radius * self.sweep_angle()
    }
}

/// 椭圆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point2,
    /// 长半轴长度
    pub major_radius: f64,
    /// 短轴/长轴比例
    pub ratio: f64,
}

impl Ellipse {
    /// 由长轴向量（取模长）与比例创建
    pub fn from_axis(center: Point2, major_axis: &Vector3, ratio: f64) -> Self {
        Self {
            center,
            major_radius: major_axis.norm(),
            ratio,
        }
    }

    pub fn minor_radius(&self) -> f64 {
        self.major_radius * self.ratio
    }

    /// 计算周长（近似值，使用 Ramanujan 公式）
    pub fn circumference(&self) -> f64 {
        let a = self.major_radius;
        let b = self.minor_radius();
        if a + b <= 0.0 {
            return 0.0;
        }
        let h = ((a - b) / (a + b)).powi(2);
        PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
    }

    /// 计算面积
    pub fn area(&self) -> f64 {
        PI * self.major_radius * self.minor_radius()
    }
}

/// 多段线顶点
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolylineVertex {
    pub point: Point2,
    /// 凸度（bulge）- 用于弧线段，0表示直线
    pub bulge: f64,
}

impl PolylineVertex {
    pub fn new(point: Point2) -> Self {
        Self { point, bulge: 0.0 }
    }

    pub fn with_bulge(point: Point2, bulge: f64) -> Self {
        Self { point, bulge }
    }
}

/// 多段线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polyline {
    pub vertices: Vec<PolylineVertex>,
    /// 是否闭合
    pub closed: bool,
}

impl Polyline {
    pub fn new(vertices: Vec<PolylineVertex>, closed: bool) -> Self {
        Self { vertices, closed }
    }

    /// 从点列表创建（所有顶点都是直线连接）
    pub fn from_points(points: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
        Self {
            vertices: points.into_iter().map(PolylineVertex::new).collect(),
            closed,
        }
    }

    /// 线段数量
    pub fn segment_count(&self) -> usize {
        if self.vertices.len() < 2 {
            return 0;
        }
        if self.closed {
            self.vertices.len()
        } else {
            self.vertices.len() - 1
        }
    }

    /// 计算总长度
    pub fn length(&self) -> f64 {
        let mut total = 0.0;
        for i in 0..self.segment_count() {
            let v1 = &self.vertices[i];
            let v2 = &self.vertices[(i + 1) % self.vertices.len()];

            if v1.bulge.abs() < EPSILON {
                total += (v2.point - v1.point).norm();
            } else {
                total += arc_segment_length(v1, v2);
            }
        }
        total
    }

    /// 闭合多段线的面积（按顶点计算，忽略凸度），开放多段线为 0
    pub fn area(&self) -> f64 {
        if !self.closed || self.vertices.len() < 3 {
            return 0.0;
        }
        let points: Vec<Point2> = self.vertices.iter().map(|v| v.point).collect();
        shoelace(&points).abs()
    }

    /// 提取为闭合轮廓
    ///
    /// 未标记闭合但首尾距离小于 [`CLOSE_TOLERANCE`] 的多段线也视为闭合。
    pub fn to_contour(&self) -> Option<Contour> {
        if self.vertices.len() < 3 {
            return None;
        }
        let mut points: Vec<Point2> = self.vertices.iter().map(|v| v.point).collect();
        let first = points[0];
        let last = points[points.len() - 1];
        if !self.closed && first != last {
            if (first - last).norm() < CLOSE_TOLERANCE {
                let n = points.len();
                points[n - 1] = first;
            } else {
                return None;
            }
        }
        Contour::new(points)
    }
}

/// 凸度弧段长度
fn arc_segment_length(v1: &PolylineVertex, v2: &PolylineVertex) -> f64 {
    let chord = (v2.point - v1.point).norm();
    let s = chord / 2.0;
    let bulge = v1.bulge.abs();
    let radius = s * (1.0 + bulge * bulge) / (2.0 * bulge);
    let angle = 4.0 * bulge.atan();
    radius * angle.abs()
}

/// 鞋带公式求有符号面积（逆时针为正）
pub fn shoelace(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum / 2.0
}

/// 闭合轮廓
///
/// 存储不含重复闭合点的顶点环，至少 3 个互异顶点。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point2>,
}

impl Contour {
    /// 创建轮廓：去除相邻重复点和末尾闭合点，少于 3 个顶点时返回 `None`
    pub fn new(points: Vec<Point2>) -> Option<Self> {
        let mut unique: Vec<Point2> = Vec::with_capacity(points.len());
        for p in points {
            if unique.last() != Some(&p) {
                unique.push(p);
            }
        }
        while unique.len() > 1 && unique.first() == unique.last() {
            unique.pop();
        }
        if unique.len() < 3 {
            return None;
        }
        Some(Self { points: unique })
    }

    /// 将圆离散化为正多边形
    pub fn from_circle(circle: &Circle, segments: usize) -> Option<Self> {
        if circle.radius <= 0.0 || segments < 3 {
            return None;
        }
        let points = (0..segments)
            .map(|i| circle.point_at_angle(i as f64 / segments as f64 * 2.0 * PI))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 有符号面积（逆时针为正）
    pub fn signed_area(&self) -> f64 {
        shoelace(&self.points)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }
}

/// 两条线段是否在内部相交（端点接触不算）
pub fn segments_cross(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > EPSILON && d2 < -EPSILON) || (d1 < -EPSILON && d2 > EPSILON))
        && ((d3 > EPSILON && d4 < -EPSILON) || (d3 < -EPSILON && d4 > EPSILON))
}
