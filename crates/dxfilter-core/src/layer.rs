//! 图层统计
//!
//! 按图层汇总模型空间实体的数量和类型。

use crate::properties::AciColor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 实体类型（面向用户的分类）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Line,
    /// LWPOLYLINE 与 POLYLINE 统一归为多段线
    Polyline,
    Arc,
    Circle,
    Ellipse,
    Spline,
    Text,
    MultilineText,
    /// INSERT 块参照
    Block,
    Dimension,
    Point,
    /// 其他类型，保留 DXF 类型名
    Other(&'static str),
}

impl EntityKind {
    /// 显示名称
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Line => "Line",
            EntityKind::Polyline => "Polyline",
            EntityKind::Arc => "Arc",
            EntityKind::Circle => "Circle",
            EntityKind::Ellipse => "Ellipse",
            EntityKind::Spline => "Spline",
            EntityKind::Text => "Text",
            EntityKind::MultilineText => "Multiline Text",
            EntityKind::Block => "Block",
            EntityKind::Dimension => "Dimension",
            EntityKind::Point => "Point",
            EntityKind::Other(name) => *name,
        }
    }

    /// 从 DXF 类型名映射
    pub fn from_dxf_type(name: &'static str) -> Self {
        match name {
            "LINE" => EntityKind::Line,
            "LWPOLYLINE" | "POLYLINE" => EntityKind::Polyline,
            "ARC" => EntityKind::Arc,
            "CIRCLE" => EntityKind::Circle,
            "ELLIPSE" => EntityKind::Ellipse,
            "SPLINE" => EntityKind::Spline,
            "TEXT" => EntityKind::Text,
            "MTEXT" => EntityKind::MultilineText,
            "INSERT" => EntityKind::Block,
            "DIMENSION" => EntityKind::Dimension,
            "POINT" => EntityKind::Point,
            other => EntityKind::Other(other),
        }
    }
}

/// 单个图层的统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStats {
    /// 实体总数
    pub count: usize,
    /// 各类型数量，按首次出现顺序
    pub kinds: Vec<(EntityKind, usize)>,
}

impl LayerStats {
    /// 记录一个实体
    pub fn record(&mut self, kind: EntityKind) {
        self.count += 1;
        match self.kinds.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, n)) => *n += 1,
            None => self.kinds.push((kind, 1)),
        }
    }

    /// 类型描述，如 `3x Line, 1x Circle`
    pub fn types_label(&self) -> String {
        if self.kinds.is_empty() {
            return "No entities".to_string();
        }
        self.kinds
            .iter()
            .map(|(kind, n)| format!("{}x {}", n, kind.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 所有图层的统计
#[derive(Debug, Clone, Default)]
pub struct LayerStatistics {
    layers: HashMap<String, LayerStats>,
}

impl LayerStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录图层上的一个实体
    pub fn record(&mut self, layer: &str, kind: EntityKind) {
        self.layers.entry(layer.to_string()).or_default().record(kind);
    }

    /// 获取图层统计（无实体的图层返回空统计）
    pub fn get(&self, layer: &str) -> LayerStats {
        self.layers.get(layer).cloned().unwrap_or_default()
    }

    /// 有实体的图层名称
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// 实体总数
    pub fn total(&self) -> usize {
        self.layers.values().map(|s| s.count).sum()
    }
}

/// 图层列表中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub name: String,
    /// ACI 颜色索引，图层关闭时为负值
    pub color: i32,
    /// 显示颜色 `#rrggbb`
    pub hex: String,
    pub linetype: String,
    pub count: usize,
    pub types: String,
}

impl LayerSummary {
    pub fn new(
        name: impl Into<String>,
        color: AciColor,
        is_on: bool,
        linetype: impl Into<String>,
        stats: &LayerStats,
    ) -> Self {
        let index = i32::from(color.index());
        Self {
            name: name.into(),
            color: if is_on { index } else { -index },
            hex: color.to_hex(),
            linetype: linetype.into(),
            count: stats.count,
            types: stats.types_label(),
        }
    }

    pub fn is_on(&self) -> bool {
        self.color >= 0
    }
}

/// 按名称排序图层列表
pub fn sort_by_name(layers: &mut [LayerSummary]) {
    layers.sort_by(|a, b| a.name.cmp(&b.name));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_label_keeps_first_seen_order() {
        let mut stats = LayerStats::default();
        stats.record(EntityKind::Line);
        stats.record(EntityKind::Circle);
        stats.record(EntityKind::Line);
        stats.record(EntityKind::Line);

        assert_eq!(stats.count, 4);
        assert_eq!(stats.types_label(), "3x Line, 1x Circle");
    }

    #[test]
    fn test_empty_layer_label() {
        let statistics = LayerStatistics::new();
        let stats = statistics.get("EMPTY");
        assert_eq!(stats.count, 0);
        assert_eq!(stats.types_label(), "No entities");
    }

    #[test]
    fn test_dxf_type_mapping() {
        assert_eq!(EntityKind::from_dxf_type("LWPOLYLINE"), EntityKind::Polyline);
        assert_eq!(EntityKind::from_dxf_type("POLYLINE"), EntityKind::Polyline);
        assert_eq!(EntityKind::from_dxf_type("MTEXT").label(), "Multiline Text");
        assert_eq!(EntityKind::from_dxf_type("3DFACE"), EntityKind::Other("3DFACE"));
        assert_eq!(EntityKind::from_dxf_type("3DFACE").label(), "3DFACE");
    }

    #[test]
    fn test_statistics_and_sort() {
        let mut statistics = LayerStatistics::new();
        statistics.record("WALLS", EntityKind::Line);
        statistics.record("DOORS", EntityKind::Arc);
        statistics.record("WALLS", EntityKind::Polyline);
        assert_eq!(statistics.total(), 3);

        let mut layers: Vec<LayerSummary> = ["WALLS", "DOORS", "0"]
            .iter()
            .map(|name| LayerSummary::new(*name, AciColor::WHITE, true, "CONTINUOUS", &statistics.get(name)))
            .collect();
        sort_by_name(&mut layers);

        let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["0", "DOORS", "WALLS"]);
        assert_eq!(layers[2].types, "1x Line, 1x Polyline");
        assert_eq!(layers[0].types, "No entities");
        assert_eq!(layers[0].hex, "#ffffff");
    }

    #[test]
    fn test_summary_of_layer_turned_off() {
        let summary = LayerSummary::new("HIDDEN", AciColor::BLUE, false, "CONTINUOUS", &LayerStats::default());
        assert_eq!(summary.color, -5);
        assert!(!summary.is_on());
        assert_eq!(summary.hex, "#0000ff");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["color"], -5);
    }

    #[test]
    fn test_other_kind_keeps_type_name() {
        let mut stats = LayerStats::default();
        stats.record(EntityKind::from_dxf_type("DIMENSION"));
        stats.record(EntityKind::from_dxf_type("3DFACE"));
        stats.record(EntityKind::from_dxf_type("SOLID"));
        assert_eq!(stats.types_label(), "1x Dimension, 1x 3DFACE, 1x SOLID");
    }
}
