use svg2dxf_core::geometry::Segment;
use svg2dxf_io::{PathDataError, SourceGroup, path_data};

use crate::layer::CUT_TOKEN;

/// 带非空元素标识或 `cut` class 的分组才参与几何转换。
#[inline]
pub fn is_eligible(group: &SourceGroup) -> bool {
    group.has_element_id() || group.has_class(CUT_TOKEN)
}

/// 逐条解析子路径，每条路径对应一个线段列表，保持文档顺序。
pub fn extract(group: &SourceGroup) -> Result<Vec<Vec<Segment>>, PathDataError> {
    group
        .child_paths
        .iter()
        .map(|data| path_data::parse(data))
        .collect()
}
