//! 单位系统
//!
//! 图纸数据统一按毫米解释，报表可换算为厘米或米。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 报表单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportUnit {
    /// 毫米 (默认)
    #[default]
    Mm,
    /// 厘米
    Cm,
    /// 米
    M,
}

impl ReportUnit {
    /// 毫米到该单位的长度换算因子
    pub fn length_factor(&self) -> f64 {
        match self {
            ReportUnit::Mm => 1.0,
            ReportUnit::Cm => 0.1,
            ReportUnit::M => 0.001,
        }
    }

    /// 平方毫米到该单位的面积换算因子
    pub fn area_factor(&self) -> f64 {
        match self {
            ReportUnit::Mm => 1.0,
            ReportUnit::Cm => 0.01,
            ReportUnit::M => 0.000_001,
        }
    }

    /// 获取单位符号
    pub fn symbol(&self) -> &'static str {
        match self {
            ReportUnit::Mm => "mm",
            ReportUnit::Cm => "cm",
            ReportUnit::M => "m",
        }
    }

    /// 宽松解析，未知单位回落到毫米
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for ReportUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 未知单位
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown unit: {0}")]
pub struct UnknownUnit(pub String);

impl FromStr for ReportUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" => Ok(ReportUnit::Mm),
            "cm" | "centimeter" | "centimeters" => Ok(ReportUnit::Cm),
            "m" | "meter" | "meters" => Ok(ReportUnit::M),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factors() {
        assert_eq!(ReportUnit::Cm.length_factor(), 0.1);
        assert_eq!(ReportUnit::Cm.area_factor(), 0.01);
        assert_eq!(ReportUnit::M.area_factor(), 1e-6);
    }

    #[test]
    fn test_parse() {
        assert_eq!("CM".parse::<ReportUnit>().unwrap(), ReportUnit::Cm);
        assert!("furlong".parse::<ReportUnit>().is_err());
        assert_eq!(ReportUnit::parse_lenient("furlong"), ReportUnit::Mm);
        assert_eq!(ReportUnit::M.to_string(), "m");
    }
}
