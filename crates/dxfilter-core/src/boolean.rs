//! 轮廓布尔运算
//!
//! 基于 `geo` 的多边形布尔运算：先合并所有切割轮廓，再从主轮廓中
//! 减去合并结果。结果可能是多个互不相连的区域，每个区域可带孔洞。

use crate::geometry::Contour;
use crate::math::Point2;
use geo::{BooleanOps, LineString, MultiPolygon, Polygon};

/// 面积低于该值的碎片区域被丢弃
pub const MIN_REGION_AREA: f64 = 1e-9;

/// 带孔洞的平面区域
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub outer: Contour,
    pub holes: Vec<Contour>,
}

impl Region {
    /// 外环面积减去孔洞面积
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(Contour::area).sum();
        (self.outer.area() - holes).max(0.0)
    }
}

fn to_multi_polygon(contour: &Contour) -> MultiPolygon<f64> {
    let ring: Vec<(f64, f64)> = contour.points().iter().map(|p| (p.x, p.y)).collect();
    MultiPolygon::new(vec![Polygon::new(LineString::from(ring), Vec::new())])
}

fn ring_to_contour(ring: &LineString<f64>) -> Option<Contour> {
    Contour::new(ring.coords().map(|c| Point2::new(c.x, c.y)).collect())
}

/// 合并多个轮廓，重叠部分只计一次
pub fn union_all(contours: &[Contour]) -> MultiPolygon<f64> {
    let mut parts = contours.iter().map(to_multi_polygon);
    let Some(first) = parts.next() else {
        return MultiPolygon::new(Vec::new());
    };
    parts.fold(first, |merged, part| merged.union(&part))
}

/// 从轮廓中减去所有切割轮廓的并集
///
/// 切割完全覆盖轮廓时返回空列表。
pub fn subtract(contour: &Contour, cuts: &[Contour]) -> Vec<Region> {
    let base = to_multi_polygon(contour);
    let remaining = if cuts.is_empty() {
        base
    } else {
        base.difference(&union_all(cuts))
    };

    remaining
        .0
        .iter()
        .filter_map(|polygon| {
            let outer = ring_to_contour(polygon.exterior())?;
            let holes = polygon.interiors().iter().filter_map(ring_to_contour).collect();
            Some(Region { outer, holes })
        })
        .filter(|region| region.area() > MIN_REGION_AREA)
        .collect()
}
