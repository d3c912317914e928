pub mod blocks;
pub mod classify;
pub mod converter;
pub mod extract;
pub mod layer;
pub mod naming;
pub mod placement;

pub use classify::{GeometryVariant, classify};
pub use converter::{ConversionReport, Converter, Diagnostic, GroupOutcome};
pub use naming::NameAllocator;

pub mod errors {
    use svg2dxf_core::document::DocumentError;
    use svg2dxf_io::PathDataError;
    use thiserror::Error;

    /// 分组几何无法归入任何变体。
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ClassificationError {
        #[error("group has no child paths")]
        NoPaths,
        #[error("first path has no drawable segment ({segments} segment(s) parsed)")]
        NoDrawableSegments { segments: usize },
    }

    #[derive(Debug, Error)]
    pub enum ConversionError {
        #[error("group {group} could not be classified: {source}")]
        Classification {
            group: String,
            #[source]
            source: ClassificationError,
        },
        #[error("path data of group {group} could not be parsed: {source}")]
        Parse {
            group: String,
            #[source]
            source: PathDataError,
        },
        #[error("document backend rejected the operation: {0}")]
        Backend(#[from] DocumentError),
    }
}
