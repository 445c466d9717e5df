use thiserror::Error;

/// Raised when a form cannot be turned into a generation request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Topik wajib diisi")]
    MissingTopic,
}

/// Raised when an export cannot produce a file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Belum ada konten untuk diunduh.")]
    EmptyContent,
    #[error("Failed to build slide deck: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}
