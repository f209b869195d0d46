use thiserror::Error;

use crate::export_as_engine::ExportFormat;

#[derive(Error, Debug)]
pub enum ExportAsError {
    #[error("Export format is not supported: {0}")]
    UnsupportedFormat(ExportFormat),

    #[error("A file name is required when download is requested")]
    MissingFileName,

    #[error("Malformed data URL: {0}")]
    MalformedDataUrl(String),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pdf error: {0}")]
    Pdf(String),

    #[error("Png error: {0}")]
    Png(String),

    #[error("Xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Docx error: {0}")]
    Docx(String),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}
