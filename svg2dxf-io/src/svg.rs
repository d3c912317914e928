//! SVG 读取：把 `<g>`、`<line>`、`<text>` 元素提取为自有数据记录。
//!
//! 转换核心只依赖这些记录，不持有 XML 树。

use std::fs;
use std::path::Path;
use std::str::FromStr;

use roxmltree::Node;
use svg2dxf_core::geometry::Point2;
use tracing::debug;

use crate::{IoError, SourceLoader};

/// 带语义标签的分组。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceGroup {
    pub element_id: Option<String>,
    pub class_tokens: Vec<String>,
    /// 全部后代 `<path>` 的 `d` 属性，按文档顺序。
    pub child_paths: Vec<String>,
}

impl SourceGroup {
    /// 是否带有非空元素标识。
    #[inline]
    pub fn has_element_id(&self) -> bool {
        self.element_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    #[inline]
    pub fn has_class(&self, token: &str) -> bool {
        self.class_tokens.iter().any(|t| t == token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceLine {
    pub start: Point2,
    pub end: Point2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceText {
    pub class: Option<String>,
    /// SVG 坐标空间中的插入点。
    pub anchor: Point2,
    pub spans: Vec<String>,
}

/// 一次读取得到的全部源记录。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDrawing {
    pub groups: Vec<SourceGroup>,
    pub lines: Vec<SourceLine>,
    pub texts: Vec<SourceText>,
}

pub struct SvgLoader {
    identifier_attribute: String,
}

impl SvgLoader {
    pub fn new() -> Self {
        Self::with_identifier_attribute("guid")
    }

    /// 按本地名匹配标识属性，忽略命名空间前缀（`ifc:guid` 的本地名为 `guid`）。
    pub fn with_identifier_attribute(name: impl Into<String>) -> Self {
        Self {
            identifier_attribute: name.into(),
        }
    }

    pub fn parse_str(&self, source: &str) -> Result<SourceDrawing, IoError> {
        // 允许 SVG 1.1 DOCTYPE 头
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let xml = roxmltree::Document::parse_with_options(source, options)
            .map_err(|err| IoError::InvalidSvg(err.to_string()))?;

        let mut drawing = SourceDrawing::default();
        for node in xml.descendants().filter(Node::is_element) {
            match node.tag_name().name() {
                "g" => drawing.groups.push(self.read_group(node)),
                "line" => drawing.lines.push(read_line(node)?),
                "text" => drawing.texts.push(read_text(node)?),
                _ => {}
            }
        }

        debug!(
            groups = drawing.groups.len(),
            lines = drawing.lines.len(),
            texts = drawing.texts.len(),
            "SVG 读取完成"
        );
        Ok(drawing)
    }

    fn read_group(&self, node: Node<'_, '_>) -> SourceGroup {
        let element_id = node
            .attributes()
            .find(|attr| attr.name() == self.identifier_attribute)
            .map(|attr| attr.value().to_string());
        let class_tokens = node
            .attribute("class")
            .map(|class| class.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let child_paths = node
            .descendants()
            .filter(|child| child.has_tag_name("path"))
            .map(|path| path.attribute("d").unwrap_or_default().to_string())
            .collect();

        SourceGroup {
            element_id,
            class_tokens,
            child_paths,
        }
    }
}

impl Default for SvgLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader for SvgLoader {
    fn load(&self, path: &Path) -> Result<SourceDrawing, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&data)
    }
}

fn read_line(node: Node<'_, '_>) -> Result<SourceLine, IoError> {
    let coord = |name: &str| number_attribute(node, name).map(|value| value.unwrap_or(0.0));
    Ok(SourceLine {
        start: Point2::new(coord("x1")?, coord("y1")?),
        end: Point2::new(coord("x2")?, coord("y2")?),
    })
}

fn read_text(node: Node<'_, '_>) -> Result<SourceText, IoError> {
    let x = number_attribute(node, "x")?.unwrap_or(0.0);
    let y = number_attribute(node, "y")?.unwrap_or(0.0);
    let anchor = match node.attribute("transform") {
        Some(raw) => {
            let ts = svgtypes::Transform::from_str(raw).map_err(|_| IoError::InvalidAttribute {
                element: "text".to_string(),
                attribute: "transform".to_string(),
                value: raw.to_string(),
            })?;
            Point2::new(ts.a * x + ts.c * y + ts.e, ts.b * x + ts.d * y + ts.f)
        }
        None => Point2::new(x, y),
    };

    let mut spans: Vec<String> = node
        .children()
        .filter(|child| child.has_tag_name("tspan"))
        .filter_map(|span| span.text().map(str::to_string))
        .collect();
    if spans.is_empty() {
        if let Some(own) = node.text().map(str::trim).filter(|t| !t.is_empty()) {
            spans.push(own.to_string());
        }
    }

    Ok(SourceText {
        class: node
            .attribute("class")
            .filter(|class| !class.is_empty())
            .map(str::to_string),
        anchor,
        spans,
    })
}

/// 读取数值属性；缺失返回 `None`，带单位的长度只取数值部分，坐标列表取首项。
fn number_attribute(node: Node<'_, '_>, name: &str) -> Result<Option<f64>, IoError> {
    let Some(raw) = node.attribute(name) else {
        return Ok(None);
    };
    let first = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .find(|token| !token.is_empty())
        .unwrap_or("");
    svgtypes::Length::from_str(first)
        .map(|length| Some(length.number))
        .map_err(|_| IoError::InvalidAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_without_class_has_no_tokens() {
        let drawing = SvgLoader::new()
            .parse_str(r#"<svg xmlns="http://www.w3.org/2000/svg"><g><path d="M0 0 L1 1"/></g></svg>"#)
            .expect("parse");
        assert_eq!(drawing.groups.len(), 1);
        let group = &drawing.groups[0];
        assert!(group.class_tokens.is_empty());
        assert!(!group.has_element_id());
        assert_eq!(group.child_paths, vec!["M0 0 L1 1".to_string()]);
    }

    #[test]
    fn line_defaults_missing_coordinates_to_zero() {
        let drawing = SvgLoader::new()
            .parse_str(r#"<svg xmlns="http://www.w3.org/2000/svg"><line x2="5px" y2="7"/></svg>"#)
            .expect("parse");
        assert_eq!(
            drawing.lines,
            vec![SourceLine {
                start: Point2::new(0.0, 0.0),
                end: Point2::new(5.0, 7.0),
            }]
        );
    }

    #[test]
    fn bad_number_is_reported() {
        let err = SvgLoader::new()
            .parse_str(r#"<svg xmlns="http://www.w3.org/2000/svg"><line x1="abc"/></svg>"#)
            .unwrap_err();
        assert!(matches!(err, IoError::InvalidAttribute { ref attribute, .. } if attribute == "x1"));
    }

    #[test]
    fn malformed_xml_is_reported() {
        let err = SvgLoader::new().parse_str("<svg><g></svg>").unwrap_err();
        assert!(matches!(err, IoError::InvalidSvg(_)));
    }
}
