//! Error types for XML export.

use thiserror::Error;

/// Errors from writing XML descriptors.
#[derive(Error, Debug)]
pub enum XmlError {
    /// XML writer failure.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Writing the descriptor to disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer produced bytes that are not UTF-8.
    #[error("descriptor is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Model content cannot be expressed in the descriptor.
    #[error("cannot export model: {0}")]
    Model(#[from] mcvol_ir::IrError),
}

/// Result type for XML export.
pub type Result<T> = std::result::Result<T, XmlError>;
