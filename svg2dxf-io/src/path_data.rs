//! `<path d="...">` 命令串解析。
//!
//! 输出序列与命令一一对应：每个 `M` 产生一个零长度的 `Move` 伪线段，
//! `L`/`H`/`V` 产生直线段，`Z` 产生回到子路径起点的闭合段（即便长度为零）。
//! 曲线与圆弧只保留起止点构成的弦。

use svg2dxf_core::geometry::{Point2, Segment, SegmentKind};
use svgtypes::{PathParser, PathSegment};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("无法解析路径数据 \"{data}\": {message}")]
pub struct PathDataError {
    pub data: String,
    pub message: String,
}

/// 将路径命令串解析为有序线段列表，空串返回空列表。
pub fn parse(data: &str) -> Result<Vec<Segment>, PathDataError> {
    let mut segments = Vec::new();
    let mut current = Point2::origin();
    let mut subpath_start = Point2::origin();
    let mut curves = 0usize;

    for item in PathParser::from(data) {
        let command = item.map_err(|err| PathDataError {
            data: data.to_string(),
            message: err.to_string(),
        })?;

        match command {
            PathSegment::MoveTo { abs, x, y } => {
                let target = resolve(abs, current, x, y);
                segments.push(Segment::move_to(target));
                current = target;
                subpath_start = target;
            }
            PathSegment::LineTo { abs, x, y } => {
                let target = resolve(abs, current, x, y);
                segments.push(Segment::line(current, target));
                current = target;
            }
            PathSegment::HorizontalLineTo { abs, x } => {
                let target = if abs {
                    Point2::new(x, current.y())
                } else {
                    Point2::new(current.x() + x, current.y())
                };
                segments.push(Segment::line(current, target));
                current = target;
            }
            PathSegment::VerticalLineTo { abs, y } => {
                let target = if abs {
                    Point2::new(current.x(), y)
                } else {
                    Point2::new(current.x(), current.y() + y)
                };
                segments.push(Segment::line(current, target));
                current = target;
            }
            PathSegment::ClosePath { .. } => {
                segments.push(Segment::new(SegmentKind::Close, current, subpath_start));
                current = subpath_start;
            }
            PathSegment::CurveTo { abs, x, y, .. }
            | PathSegment::SmoothCurveTo { abs, x, y, .. }
            | PathSegment::Quadratic { abs, x, y, .. }
            | PathSegment::SmoothQuadratic { abs, x, y }
            | PathSegment::EllipticalArc { abs, x, y, .. } => {
                let target = resolve(abs, current, x, y);
                segments.push(Segment::new(SegmentKind::Curve, current, target));
                current = target;
                curves += 1;
            }
        }
    }

    if curves > 0 {
        debug!(curves, "曲线命令已按弦处理");
    }
    Ok(segments)
}

#[inline]
fn resolve(abs: bool, current: Point2, x: f64, y: f64) -> Point2 {
    if abs {
        Point2::new(x, y)
    } else {
        Point2::new(current.x() + x, current.y() + y)
    }
}
