pub mod dxf_writer;
pub mod path_data;
pub mod svg;

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;
use svg2dxf_core::document::Document;

pub use path_data::PathDataError;
pub use svg::{SourceDrawing, SourceGroup, SourceLine, SourceText, SvgLoader};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid SVG document: {0}")]
    InvalidSvg(String),
    #[error("invalid value {value:?} for attribute `{attribute}` on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error(transparent)]
    PathData(#[from] PathDataError),
}

/// 源图形读取接口。
pub trait SourceLoader {
    fn load(&self, path: &Path) -> Result<SourceDrawing, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError>;
}

pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }

    pub fn write_to_string(&self, document: &Document) -> String {
        dxf_writer::write_document(document)
    }
}

impl Default for DxfFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSaver for DxfFacade {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError> {
        let content = self.write_to_string(document);
        fs::write(path, content.as_bytes()).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            layers = document.layers().count(),
            blocks = document.blocks().count(),
            entities = document.entities().count(),
            "DXF 写出完成"
        );
        Ok(())
    }
}
