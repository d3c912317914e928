use svg2dxf_core::geometry::Segment;
use tracing::debug;

use crate::errors::ClassificationError;

/// 分组几何的两种形态。
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryVariant {
    /// 每条路径恰好两个线段（`Move` + 一条可绘制线段）。
    LinePair(Vec<[Segment; 2]>),
    /// 首条路径的线段序列，描述一个闭合填充轮廓。
    HatchBoundary(Vec<Segment>),
}

impl GeometryVariant {
    pub fn name(&self) -> &'static str {
        match self {
            GeometryVariant::LinePair(_) => "line_pair",
            GeometryVariant::HatchBoundary(_) => "hatch_boundary",
        }
    }
}

/// 所有路径均为两段时判定为 `LinePair`，否则取首条路径作为 `HatchBoundary`。
pub fn classify(paths: Vec<Vec<Segment>>) -> Result<GeometryVariant, ClassificationError> {
    let path_count = paths.len();
    if path_count == 0 {
        return Err(ClassificationError::NoPaths);
    }

    if paths.iter().all(|path| path.len() == 2) {
        let pairs = paths
            .into_iter()
            .filter_map(|path| <[Segment; 2]>::try_from(path).ok())
            .collect();
        return Ok(GeometryVariant::LinePair(pairs));
    }

    let mut paths = paths.into_iter();
    let first = paths.next().unwrap_or_default();
    if first.len() < 2 {
        return Err(ClassificationError::NoDrawableSegments {
            segments: first.len(),
        });
    }
    if path_count > 1 {
        debug!(ignored = path_count - 1, "填充轮廓仅使用首条路径");
    }
    Ok(GeometryVariant::HatchBoundary(first))
}
