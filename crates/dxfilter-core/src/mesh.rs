//! 拉伸网格
//!
//! 将闭合轮廓沿 Z 轴拉伸为三角网格，供浏览器端的 3D 预览使用。
//!
//! 顶点布局：前 `n` 个为底面 (z = z_offset)，后 `n` 个为顶面
//! (z = z_offset + height)，`n` 为外环与所有孔洞顶点数之和。
//!
//! 带孔多边形的三角剖分采用耳切法：先把每个孔洞通过一条桥接边
//! 接入外环，得到一个弱简单多边形，再逐个切除"耳朵"。

use crate::geometry::Contour;
use crate::math::{cross, Point2, EPSILON};
use serde::{Deserialize, Serialize};

/// 三角网格
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// 底面与顶面顶点
    fn push_layers(&mut self, points: &[Point2], z_offset: f64, height: f64) {
        self.vertices
            .extend(points.iter().map(|p| [p.x, p.y, z_offset]));
        self.vertices
            .extend(points.iter().map(|p| [p.x, p.y, z_offset + height]));
    }
}

/// 三角剖分错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("Could not bridge hole {0} to the outer ring")]
    BridgeFailed(usize),

    #[error("Ear clipping stalled with {0} vertices left")]
    EarClippingStalled(usize),
}

/// 简单拉伸（不含孔洞）
///
/// 顶面/底面使用以首顶点为中心的扇形三角化，只对凸多边形严格正确。
pub fn simple_extrusion(ring: &Contour, z_offset: f64, height: f64) -> Mesh {
    let points = ring.points();
    let n = points.len();
    let mut mesh = Mesh::default();
    mesh.push_layers(points, z_offset, height);

    for i in 1..n - 1 {
        mesh.faces.push([0, i, i + 1]);
    }
    for i in 1..n - 1 {
        mesh.faces.push([n, n + i + 1, n + i]);
    }
    for i in 0..n {
        let next = (i + 1) % n;
        mesh.faces.push([i, next, n + i]);
        mesh.faces.push([next, n + next, n + i]);
    }
    mesh
}

/// 带孔拉伸
///
/// 三角剖分失败时回退到 [`simple_extrusion`]（忽略孔洞）。
pub fn extrude_with_holes(outer: &Contour, holes: &[Contour], z_offset: f64, height: f64) -> Mesh {
    let triangles = match triangulate(outer, holes) {
        Ok(triangles) => triangles,
        Err(_) => return simple_extrusion(outer, z_offset, height),
    };

    let points: Vec<Point2> = outer
        .points()
        .iter()
        .chain(holes.iter().flat_map(|h| h.points().iter()))
        .copied()
        .collect();
    let np = points.len();

    let mut mesh = Mesh::default();
    mesh.push_layers(&points, z_offset, height);

    for t in &triangles {
        mesh.faces.push(*t);
    }
    for t in &triangles {
        mesh.faces.push([t[0] + np, t[2] + np, t[1] + np]);
    }

    let n_ext = outer.len();
    for i in 0..n_ext {
        let next = (i + 1) % n_ext;
        mesh.faces.push([i, next, i + np]);
        mesh.faces.push([next, next + np, i + np]);
    }

    // 孔洞侧壁朝内，绕向相反
    let mut offset = n_ext;
    for hole in holes {
        let n_hole = hole.len();
        for i in 0..n_hole {
            let curr = offset + i;
            let next = offset + (i + 1) % n_hole;
            mesh.faces.push([curr, curr + np, next]);
            mesh.faces.push([next, curr + np, next + np]);
        }
        offset += n_hole;
    }

    mesh
}

/// 耳切法三角剖分
///
/// 返回的索引指向 `outer ++ holes` 顺序拼接后的顶点数组。
/// 对含 `k` 个顶点的外环和 `h_i` 个顶点的孔洞，正常情况下得到
/// `k + Σh_i + 2·孔洞数 - 2` 个三角形。
pub fn triangulate(outer: &Contour, holes: &[Contour]) -> Result<Vec<[usize; 3]>, MeshError> {
    let mut points: Vec<Point2> = outer.points().to_vec();

    let mut ring: Vec<usize> = (0..outer.len()).collect();
    if !outer.is_ccw() {
        ring.reverse();
    }

    let mut hole_rings: Vec<Vec<usize>> = Vec::with_capacity(holes.len());
    for hole in holes {
        let offset = points.len();
        points.extend_from_slice(hole.points());
        let mut indices: Vec<usize> = (offset..offset + hole.len()).collect();
        // 孔洞与外环绕向相反
        if hole.is_ccw() {
            indices.reverse();
        }
        hole_rings.push(indices);
    }

    // 先桥接最右侧的孔洞，后续桥接边不会穿过已处理的孔洞
    let mut order: Vec<usize> = (0..hole_rings.len()).collect();
    order.sort_by(|&a, &b| {
        let ax = max_x(&points, &hole_rings[a]);
        let bx = max_x(&points, &hole_rings[b]);
        bx.total_cmp(&ax)
    });

    for (done, &hole_idx) in order.iter().enumerate() {
        let pending: Vec<&Vec<usize>> = order[done + 1..].iter().map(|&i| &hole_rings[i]).collect();
        ring = bridge_hole(&points, ring, &hole_rings[hole_idx], &pending)
            .ok_or(MeshError::BridgeFailed(hole_idx))?;
    }

    ear_clip(&points, ring)
}

fn max_x(points: &[Point2], ring: &[usize]) -> f64 {
    ring.iter().map(|&i| points[i].x).fold(f64::MIN, f64::max)
}

/// 将孔洞接入外环
///
/// 选择孔洞最右侧顶点，连接到距离最近且可见的环顶点，
/// 把孔洞顶点序列插入环中，桥接两端的顶点各出现两次。
fn bridge_hole(
    points: &[Point2],
    ring: Vec<usize>,
    hole: &[usize],
    pending: &[&Vec<usize>],
) -> Option<Vec<usize>> {
    let (h_pos, &h) = hole
        .iter()
        .enumerate()
        .max_by(|a, b| points[*a.1].x.total_cmp(&points[*b.1].x))?;
    let hp = points[h];

    let n = ring.len();
    let mut best: Option<(usize, f64)> = None;
    for pos in 0..n {
        let v = ring[pos];
        let vp = points[v];
        let dist = (vp - hp).norm_squared();
        if best.is_some_and(|(_, d)| dist >= d) {
            continue;
        }
        let a = points[ring[(pos + n - 1) % n]];
        let b = points[ring[(pos + 1) % n]];
        if !in_wedge(&a, &vp, &b, &hp) {
            continue;
        }
        if crosses_ring(points, &ring, &hp, &vp)
            || crosses_ring(points, hole, &hp, &vp)
            || pending.iter().any(|r| crosses_ring(points, r, &hp, &vp))
        {
            continue;
        }
        best = Some((pos, dist));
    }
    let (pos, _) = best?;

    let mut merged = Vec::with_capacity(n + hole.len() + 2);
    merged.extend_from_slice(&ring[..=pos]);
    merged.extend(hole[h_pos..].iter().chain(hole[..h_pos].iter()).copied());
    merged.push(h);
    merged.push(ring[pos]);
    merged.extend_from_slice(&ring[pos + 1..]);
    Some(merged)
}

/// `p` 是否位于逆时针环在顶点 `v` 处的内角之内
fn in_wedge(a: &Point2, v: &Point2, b: &Point2, p: &Point2) -> bool {
    let left_of_incoming = cross(a, v, p) > EPSILON;
    let left_of_outgoing = cross(v, b, p) > EPSILON;
    if cross(a, v, b) >= 0.0 {
        left_of_incoming && left_of_outgoing
    } else {
        left_of_incoming || left_of_outgoing
    }
}

/// 线段 `p`-`q` 是否穿过环上任意一条边或经过环上的顶点
fn crosses_ring(points: &[Point2], ring: &[usize], p: &Point2, q: &Point2) -> bool {
    let n = ring.len();
    (0..n).any(|i| {
        let a = points[ring[i]];
        let b = points[ring[(i + 1) % n]];
        crate::geometry::segments_cross(p, q, &a, &b) || on_open_segment(p, q, &a)
    })
}

/// `r` 是否落在线段 `p`-`q` 内部（不含端点）
fn on_open_segment(p: &Point2, q: &Point2, r: &Point2) -> bool {
    if r == p || r == q || cross(p, q, r).abs() > EPSILON {
        return false;
    }
    r.x >= p.x.min(q.x) - EPSILON
        && r.x <= p.x.max(q.x) + EPSILON
        && r.y >= p.y.min(q.y) - EPSILON
        && r.y <= p.y.max(q.y) + EPSILON
}

fn ear_clip(points: &[Point2], mut ring: Vec<usize>) -> Result<Vec<[usize; 3]>, MeshError> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() > 3 {
        let n = ring.len();
        let ear = (0..n).find(|&i| is_ear(points, &ring, i));

        match ear {
            Some(i) => {
                let prev = ring[(i + n - 1) % n];
                let next = ring[(i + 1) % n];
                triangles.push([prev, ring[i], next]);
                ring.remove(i);
            }
            None => {
                // 共线顶点不构成耳朵，直接移除
                let degenerate = (0..n).find(|&i| {
                    let a = points[ring[(i + n - 1) % n]];
                    let b = points[ring[i]];
                    let c = points[ring[(i + 1) % n]];
                    cross(&a, &b, &c).abs() <= EPSILON
                });
                match degenerate {
                    Some(i) => {
                        ring.remove(i);
                    }
                    None => return Err(MeshError::EarClippingStalled(n)),
                }
            }
        }
    }

    if ring.len() == 3 {
        let (a, b, c) = (points[ring[0]], points[ring[1]], points[ring[2]]);
        if cross(&a, &b, &c).abs() > EPSILON {
            triangles.push([ring[0], ring[1], ring[2]]);
        }
    }
    Ok(triangles)
}

fn is_ear(points: &[Point2], ring: &[usize], i: usize) -> bool {
    let n = ring.len();
    let ia = ring[(i + n - 1) % n];
    let ib = ring[i];
    let ic = ring[(i + 1) % n];
    let (a, b, c) = (points[ia], points[ib], points[ic]);

    if cross(&a, &b, &c) <= EPSILON {
        return false;
    }

    // 只有凹顶点可能落在耳朵内部
    for j in 0..n {
        let idx = ring[j];
        if idx == ia || idx == ib || idx == ic {
            continue;
        }
        let p = points[idx];
        if p == a || p == b || p == c {
            continue;
        }
        let prev = points[ring[(j + n - 1) % n]];
        let next = points[ring[(j + 1) % n]];
        if cross(&prev, &p, &next) > EPSILON {
            continue;
        }
        if point_in_triangle(&a, &b, &c, &p) {
            return false;
        }
    }
    true
}

/// 点是否在逆时针三角形内（含边界）
fn point_in_triangle(a: &Point2, b: &Point2, c: &Point2, p: &Point2) -> bool {
    cross(a, b, p) >= -EPSILON && cross(b, c, p) >= -EPSILON && cross(c, a, p) >= -EPSILON
}
