//! 颜色属性
//!
//! DXF 图层和实体使用 AutoCAD 颜色索引 (ACI)。

use serde::{Deserialize, Serialize};

/// AutoCAD 颜色索引
///
/// 0 表示 ByBlock，256 表示 ByLayer，1..=255 为调色板颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AciColor(pub u16);

impl AciColor {
    pub const BY_BLOCK: AciColor = AciColor(0);
    pub const RED: AciColor = AciColor(1);
    pub const YELLOW: AciColor = AciColor(2);
    pub const GREEN: AciColor = AciColor(3);
    pub const CYAN: AciColor = AciColor(4);
    pub const BLUE: AciColor = AciColor(5);
    pub const MAGENTA: AciColor = AciColor(6);
    pub const WHITE: AciColor = AciColor(7);
    pub const GRAY: AciColor = AciColor(8);
    pub const LIGHT_GRAY: AciColor = AciColor(9);
    pub const BY_LAYER: AciColor = AciColor(256);

    /// 从调色板索引创建，超出范围时回落到白色
    pub fn from_index(index: i32) -> Self {
        if (1..=255).contains(&index) {
            AciColor(index as u16)
        } else {
            Self::WHITE
        }
    }

    pub fn index(&self) -> u16 {
        self.0
    }

    pub fn is_by_layer(&self) -> bool {
        self.0 == 256
    }

    pub fn is_by_block(&self) -> bool {
        self.0 == 0
    }

    /// 近似 RGB 值
    ///
    /// 标准色 1-9 精确映射，250-255 为灰阶，其余按色相环近似。
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self.0 {
            1 => (255, 0, 0),
            2 => (255, 255, 0),
            3 => (0, 255, 0),
            4 => (0, 255, 255),
            5 => (0, 0, 255),
            6 => (255, 0, 255),
            7 => (255, 255, 255),
            8 => (128, 128, 128),
            9 => (192, 192, 192),
            250..=255 => {
                let level = 51 + (self.0 - 250) as u32 * 40;
                let level = level.min(255) as u8;
                (level, level, level)
            }
            10..=249 => hue_ring_rgb(self.0),
            _ => (255, 255, 255),
        }
    }

    /// 浏览器使用的 `#rrggbb` 字符串
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Default for AciColor {
    fn default() -> Self {
        Self::BY_LAYER
    }
}

/// ACI 10-249：24 个色相，每个色相 10 个明度/饱和度变体
fn hue_ring_rgb(index: u16) -> (u8, u8, u8) {
    let offset = index - 10;
    let hue = (offset / 10) as f64 * 15.0;
    let variant = offset % 10;

    // 偶数变体为全饱和，奇数变体为半饱和；每两个变体降低一级明度
    let value = [1.0, 0.8, 0.6, 0.5, 0.3][(variant / 2) as usize];
    let saturation = if variant % 2 == 0 { 1.0 } else { 0.5 };

    let c = value * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}
