//! 块构建：把分类后的几何换算到块局部坐标，并给出块参照的落点。
//!
//! 块内几何一律放在默认图层 `"0"`，颜色与图层由块参照决定。

use svg2dxf_config::HatchOriginMode;
use svg2dxf_core::document::{BlockDefinition, ColorMode, DEFAULT_LAYER};
use svg2dxf_core::geometry::{Point2, Segment};

use crate::errors::ClassificationError;
use crate::layer::CUT_SUFFIX;
use crate::naming::NameAllocator;
use crate::placement::Placement;

/// 构建完成、尚未写入文档的块。
#[derive(Debug, Clone)]
pub struct BuiltBlock {
    pub definition: BlockDefinition,
    pub placement: Placement,
}

impl BuiltBlock {
    #[inline]
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

/// 线对块：插入点取首条路径可绘制线段的起点（已镜像），每条路径生成一条两点开放多段线。
pub fn build_line_pair(
    element_id: &str,
    pairs: &[[Segment; 2]],
    layer: &str,
    names: &mut NameAllocator,
) -> Result<BuiltBlock, ClassificationError> {
    let first = pairs.first().ok_or(ClassificationError::NoPaths)?;
    let origin = first[1].start.flip_y();

    let mut definition = BlockDefinition::new(names.unique(element_id));
    for [_, segment] in pairs {
        definition.add_polyline(
            [
                segment.start.flip_y().relative_to(origin),
                segment.end.flip_y().relative_to(origin),
            ],
            false,
            DEFAULT_LAYER,
        );
    }

    Ok(BuiltBlock {
        definition,
        placement: Placement::new(layer, origin, ColorMode::ByLayer),
    })
}

/// 跳过首个 `Move`，按顺序连接线段得到世界坐标（Y 轴向上）下的轮廓顶点。
///
/// 第一条线段贡献起点与终点，其后每条只贡献终点，默认线段首尾相接。
pub fn hatch_boundary(segments: &[Segment]) -> Result<Vec<Point2>, ClassificationError> {
    let [_, first, rest @ ..] = segments else {
        return Err(ClassificationError::NoDrawableSegments {
            segments: segments.len(),
        });
    };
    let mut boundary = Vec::with_capacity(rest.len() + 2);
    boundary.push(first.start.flip_y());
    boundary.push(first.end.flip_y());
    boundary.extend(rest.iter().map(|segment| segment.end.flip_y()));
    Ok(boundary)
}

/// 填充轮廓块的局部零点。
pub fn hatch_origin(first_vertex: Point2, mode: HatchOriginMode) -> Point2 {
    match mode {
        HatchOriginMode::Legacy => first_vertex.flip_y(),
        HatchOriginMode::FirstVertex => first_vertex,
    }
}

/// 填充轮廓块：闭合多段线，按局部坐标存放；块参照随块着色。
pub fn build_hatch_outline(
    element_id: &str,
    boundary: &[Point2],
    mode: HatchOriginMode,
    layer: &str,
    names: &mut NameAllocator,
) -> Result<BuiltBlock, ClassificationError> {
    let first_vertex = boundary
        .first()
        .copied()
        .ok_or(ClassificationError::NoDrawableSegments { segments: 0 })?;
    let origin = hatch_origin(first_vertex, mode);

    let mut definition = BlockDefinition::new(names.unique_or(element_id, CUT_SUFFIX));
    definition.add_polyline(
        boundary.iter().map(|vertex| vertex.relative_to(origin)),
        true,
        DEFAULT_LAYER,
    );

    Ok(BuiltBlock {
        definition,
        placement: Placement::new(layer, origin, ColorMode::ByBlock),
    })
}
