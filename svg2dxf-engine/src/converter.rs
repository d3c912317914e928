use svg2dxf_config::{ConversionConfig, DegeneratePolicy};
use svg2dxf_core::document::{ColorMode, DEFAULT_LAYER, Document};
use svg2dxf_core::geometry::Point2;
use svg2dxf_io::{SourceDrawing, SourceGroup, SourceLine, SourceText};
use tracing::{debug, info, warn};

use crate::blocks::{self, BuiltBlock};
use crate::classify::{GeometryVariant, classify};
use crate::errors::{ClassificationError, ConversionError};
use crate::extract::{extract, is_eligible};
use crate::layer;
use crate::naming::NameAllocator;
use crate::placement;

/// 被跳过的退化分组。
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 分组在源文档中的序号（从 0 开始）。
    pub group_index: usize,
    pub element_id: Option<String>,
    pub error: ClassificationError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    pub groups_seen: usize,
    pub groups_skipped: usize,
    pub line_blocks: usize,
    pub hatch_blocks: usize,
    pub lines: usize,
    pub texts: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionReport {
    pub fn blocks(&self) -> usize {
        self.line_blocks + self.hatch_blocks
    }
}

/// 单个分组的处理结果。
#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    /// 无标识且非剖切，不参与转换。
    Ineligible,
    LinePair { block: String },
    HatchBoundary { block: String },
    /// 退化分组，已记录诊断。
    Skipped,
}

/// 已完成坐标换算、待写入文档的分组输出。
enum Prepared {
    LinePair(BuiltBlock),
    HatchBoundary {
        boundary: Vec<Point2>,
        block: BuiltBlock,
    },
}

/// SVG 到 CAD 文档的转换器，持有输出文档与块名分配器。
pub struct Converter {
    config: ConversionConfig,
    names: NameAllocator,
    document: Document,
    report: ConversionReport,
}

impl Converter {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            names: NameAllocator::new(),
            document: Document::new(),
            report: ConversionReport::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub fn report(&self) -> &ConversionReport {
        &self.report
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn into_parts(self) -> (Document, ConversionReport) {
        (self.document, self.report)
    }

    /// 依次执行分组、直线、文字三个阶段；直线与文字阶段可由配置关闭。
    pub fn convert(&mut self, drawing: &SourceDrawing) -> Result<&ConversionReport, ConversionError> {
        self.convert_groups(&drawing.groups)?;
        if self.config.convert_lines {
            self.convert_lines(&drawing.lines);
        } else {
            debug!(count = drawing.lines.len(), "直线转换已关闭");
        }
        if self.config.convert_texts {
            self.convert_texts(&drawing.texts);
        } else {
            debug!(count = drawing.texts.len(), "文字转换已关闭");
        }
        info!(
            groups = self.report.groups_seen,
            skipped = self.report.groups_skipped,
            blocks = self.report.blocks(),
            lines = self.report.lines,
            texts = self.report.texts,
            diagnostics = self.report.diagnostics.len(),
            "转换完成"
        );
        Ok(&self.report)
    }

    pub fn convert_groups(&mut self, groups: &[SourceGroup]) -> Result<(), ConversionError> {
        for (index, group) in groups.iter().enumerate() {
            self.convert_group(index, group)?;
        }
        Ok(())
    }

    pub fn convert_group(
        &mut self,
        index: usize,
        group: &SourceGroup,
    ) -> Result<GroupOutcome, ConversionError> {
        self.report.groups_seen += 1;
        if !is_eligible(group) {
            self.report.groups_skipped += 1;
            return Ok(GroupOutcome::Ineligible);
        }

        let layer = layer::resolve(&group.class_tokens);
        if layer.is_empty() {
            debug!(group = %group_label(index, group), "图层名为空，使用默认图层");
        }
        let element_id = group.element_id.as_deref().unwrap_or_default();

        let paths = extract(group).map_err(|source| ConversionError::Parse {
            group: group_label(index, group),
            source,
        })?;

        let prepared = match classify(paths)
            .and_then(|variant| self.prepare(element_id, &layer, variant))
        {
            Ok(prepared) => prepared,
            Err(error) => return self.degenerate(index, group, error),
        };

        let outcome = match prepared {
            Prepared::LinePair(block) => {
                let name = block.name().to_string();
                placement::emit(&mut self.document, block.definition, &block.placement)?;
                self.report.line_blocks += 1;
                GroupOutcome::LinePair { block: name }
            }
            Prepared::HatchBoundary { boundary, block } => {
                let name = block.name().to_string();
                self.document
                    .add_hatch(boundary, ColorMode::ByLayer, layer.as_str());
                placement::emit(&mut self.document, block.definition, &block.placement)?;
                self.report.hatch_blocks += 1;
                GroupOutcome::HatchBoundary { block: name }
            }
        };

        debug!(group = %group_label(index, group), layer = %layer, ?outcome, "分组转换完成");
        Ok(outcome)
    }

    fn prepare(
        &mut self,
        element_id: &str,
        layer: &str,
        variant: GeometryVariant,
    ) -> Result<Prepared, ClassificationError> {
        match variant {
            GeometryVariant::LinePair(pairs) => Ok(Prepared::LinePair(blocks::build_line_pair(
                element_id,
                &pairs,
                layer,
                &mut self.names,
            )?)),
            GeometryVariant::HatchBoundary(segments) => {
                let boundary = blocks::hatch_boundary(&segments)?;
                let block = blocks::build_hatch_outline(
                    element_id,
                    &boundary,
                    self.config.hatch_origin,
                    layer,
                    &mut self.names,
                )?;
                Ok(Prepared::HatchBoundary { boundary, block })
            }
        }
    }

    fn degenerate(
        &mut self,
        index: usize,
        group: &SourceGroup,
        error: ClassificationError,
    ) -> Result<GroupOutcome, ConversionError> {
        match self.config.degenerate_groups {
            DegeneratePolicy::Skip => {
                warn!(group = %group_label(index, group), %error, "跳过退化分组");
                self.report.diagnostics.push(Diagnostic {
                    group_index: index,
                    element_id: group.element_id.clone(),
                    error,
                });
                Ok(GroupOutcome::Skipped)
            }
            DegeneratePolicy::Error => Err(ConversionError::Classification {
                group: group_label(index, group),
                source: error,
            }),
        }
    }

    /// 每条 `<line>` 生成默认图层上的两点开放多段线。
    ///
    /// 端点做 Y 轴镜像，与分组几何处于同一坐标系，而非原样复制 SVG 坐标。
    pub fn convert_lines(&mut self, lines: &[SourceLine]) {
        for line in lines {
            self.document.add_polyline(
                [line.start.flip_y(), line.end.flip_y()],
                false,
                DEFAULT_LAYER,
            );
            self.report.lines += 1;
        }
    }

    /// 无 class 的 `<text>` 按行生成文字实体，带 class 的视为注释跳过。
    pub fn convert_texts(&mut self, texts: &[SourceText]) {
        let height = self.config.text_height;
        for text in texts {
            if text.class.is_some() {
                continue;
            }
            let insert = text.anchor.flip_y();
            for span in &text.spans {
                self.document
                    .add_text(insert, span.as_str(), height, 0.0, DEFAULT_LAYER);
                self.report.texts += 1;
            }
        }
    }
}

fn group_label(index: usize, group: &SourceGroup) -> String {
    match group.element_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("#{index}"),
    }
}
