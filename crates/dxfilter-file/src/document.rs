//! 已解析的图纸文档

use crate::dxf_io::{self, DrawingEntity, FilterOutcome};
use crate::error::FileError;
use crate::report::{self, LayerReport};
use crate::solid::{self, ExtrusionRequest, SolidGeometry};
use crate::viewer::{self, ViewerEntity};
use dxf::Drawing;
use dxfilter_core::layer::LayerSummary;
use dxfilter_core::units::ReportUnit;

/// 图纸文档
///
/// 持有 `dxf` 图纸与转换后的模型空间实体，后者供预览、报表和拉伸复用。
pub struct DrawingDocument {
    drawing: Drawing,
    entities: Vec<DrawingEntity>,
}

impl DrawingDocument {
    pub fn from_drawing(drawing: Drawing) -> Self {
        let entities = dxf_io::convert_model_space(&drawing);
        Self { drawing, entities }
    }

    /// 从 DXF 字节解析
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FileError> {
        dxf_io::load_bytes(bytes).map(Self::from_drawing)
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    /// 模型空间实体
    pub fn entities(&self) -> &[DrawingEntity] {
        &self.entities
    }

    /// 图层列表，按名称排序
    pub fn layers(&self) -> Vec<LayerSummary> {
        dxf_io::list_layers(&self.drawing)
    }

    pub fn viewer_entities(&self, selected: &[String]) -> Vec<ViewerEntity> {
        viewer::viewer_entities(&self.entities, selected)
    }

    /// 测量报表，未选择图层时报错
    pub fn report(&self, selected: &[String], unit: ReportUnit) -> Result<Vec<LayerReport>, FileError> {
        if selected.is_empty() {
            return Err(FileError::EmptySelection);
        }
        Ok(report::build_report(&self.entities, selected, unit))
    }

    pub fn solids(&self, requests: &[ExtrusionRequest]) -> Vec<SolidGeometry> {
        solid::build_all(&self.entities, requests)
    }

    /// 生成只含选中图层的新图纸
    pub fn filter(&self, selected: &[String]) -> Result<FilterOutcome, FileError> {
        dxf_io::filter_layers(&self.drawing, selected)
    }
}

impl std::fmt::Debug for DrawingDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingDocument")
            .field("version", &self.drawing.header.version)
            .field("entities", &self.entities.len())
            .finish()
    }
}
