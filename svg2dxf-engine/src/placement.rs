use svg2dxf_core::document::{BlockDefinition, ColorMode, Document, DocumentError, EntityId};
use svg2dxf_core::geometry::Point2;
use tracing::debug;

/// 块参照在模型空间中的落点。
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub layer: String,
    pub origin: Point2,
    pub color: ColorMode,
}

impl Placement {
    pub fn new(layer: impl Into<String>, origin: Point2, color: ColorMode) -> Self {
        Self {
            layer: layer.into(),
            origin,
            color,
        }
    }

    /// 块局部坐标换算到世界坐标。
    #[inline]
    pub fn to_world(&self, local: Point2) -> Point2 {
        Point2::from_vec(local.as_vec2() + self.origin.as_vec2())
    }
}

/// 注册块定义并在模型空间追加一个块参照。
pub fn emit(
    document: &mut Document,
    definition: BlockDefinition,
    placement: &Placement,
) -> Result<EntityId, DocumentError> {
    let name = definition.name.clone();
    document.add_block_definition(definition)?;
    let id = document.add_block_reference(
        name.as_str(),
        placement.origin,
        placement.color,
        placement.layer.as_str(),
    )?;
    debug!(
        block = %name,
        layer = %placement.layer,
        x = placement.origin.x(),
        y = placement.origin.y(),
        "插入块参照"
    );
    Ok(id)
}
