//! 测试用图纸

use dxf::entities::{Circle, Entity, EntityType, Insert, Line, LwPolyline};
use dxf::enums::AcadVersion;
use dxf::tables::{Layer, LineType};
use dxf::{Block, Color, Drawing, LwPolylineVertex, Point};

pub fn layer(name: &str, color: u8, line_type: &str) -> Layer {
    let mut layer = Layer::default();
    layer.name = name.to_string();
    layer.color = Color::from_index(color);
    layer.line_type_name = line_type.to_string();
    layer
}

pub fn on_layer(specific: EntityType, layer: &str) -> Entity {
    let mut entity = Entity::new(specific);
    entity.common.layer = layer.to_string();
    entity
}

pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> EntityType {
    let mut line = Line::default();
    line.p1 = Point::new(x1, y1, 0.0);
    line.p2 = Point::new(x2, y2, 0.0);
    EntityType::Line(line)
}

pub fn circle(x: f64, y: f64, radius: f64) -> EntityType {
    let mut circle = Circle::default();
    circle.center = Point::new(x, y, 0.0);
    circle.radius = radius;
    EntityType::Circle(circle)
}

pub fn arc(x: f64, y: f64, radius: f64, start_deg: f64, end_deg: f64) -> EntityType {
    let mut arc = dxf::entities::Arc::default();
    arc.center = Point::new(x, y, 0.0);
    arc.radius = radius;
    arc.start_angle = start_deg;
    arc.end_angle = end_deg;
    EntityType::Arc(arc)
}

pub fn polyline(points: &[(f64, f64)], closed: bool) -> EntityType {
    let mut poly = LwPolyline::default();
    poly.vertices = points
        .iter()
        .map(|(x, y)| {
            let mut vertex = LwPolylineVertex::default();
            vertex.x = *x;
            vertex.y = *y;
            vertex
        })
        .collect();
    poly.set_is_closed(closed);
    EntityType::LwPolyline(poly)
}

pub fn square(x: f64, y: f64, size: f64) -> EntityType {
    polyline(
        &[(x, y), (x + size, y), (x + size, y + size), (x, y + size)],
        true,
    )
}

pub fn insert(block: &str) -> EntityType {
    let mut insert = Insert::default();
    insert.name = block.to_string();
    EntityType::Insert(insert)
}

/// 三个图层的示例图纸
///
/// - WALLS (红, CONTINUOUS)：1 条直线、1 个 100x100 闭合正方形、1 个圆
/// - DOORS (绿, DASHED)：1 段圆弧、1 个块参照 HINGE
/// - EMPTY (蓝)：无实体
pub fn sample_drawing() -> Drawing {
    let mut drawing = Drawing::new();
    drawing.header.version = AcadVersion::R2000;

    let mut dashed = LineType::default();
    dashed.name = "DASHED".to_string();
    drawing.add_line_type(dashed);

    drawing.add_layer(layer("WALLS", 1, "CONTINUOUS"));
    drawing.add_layer(layer("DOORS", 3, "DASHED"));
    drawing.add_layer(layer("EMPTY", 5, "CONTINUOUS"));

    let mut hinge = Block::default();
    hinge.name = "HINGE".to_string();
    hinge.layer = "DOORS".to_string();
    hinge.entities.push(Entity::new(circle(0.0, 0.0, 1.0)));
    drawing.add_block(hinge);

    drawing.add_entity(on_layer(line(0.0, 0.0, 30.0, 40.0), "WALLS"));
    drawing.add_entity(on_layer(square(0.0, 0.0, 100.0), "WALLS"));
    drawing.add_entity(on_layer(circle(50.0, 50.0, 10.0), "WALLS"));
    drawing.add_entity(on_layer(arc(0.0, 0.0, 10.0, 0.0, 90.0), "DOORS"));
    drawing.add_entity(on_layer(insert("HINGE"), "DOORS"));

    drawing
}

pub fn sample_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    sample_drawing()
        .save(&mut buf)
        .expect("sample drawing should serialize");
    buf
}
