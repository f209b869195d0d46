use bytes::Bytes;

use crate::{
    download::{Blob, SaveTarget},
    encoding,
    error::ExportAsError,
    export_as_engine::{ExportOutput, ExportRequest},
};

pub mod csv;
pub mod docx;
pub mod json;
pub mod pdf;
pub mod png;
pub mod xlsx;
pub mod xml;

#[derive(Debug)]
pub struct Exported {
    pub data: Bytes,
    pub mime: &'static str,
    pub extension: &'static str,
}

pub trait Export: Send + Sync {
    fn export(
        &self,
        request: &ExportRequest,
        target: &dyn SaveTarget,
    ) -> Result<ExportOutput, ExportAsError>;
}

/// Shared delivery step: hand the bytes to the save target when `download`
/// is set, otherwise return them as a data URL. The saved file always
/// carries the handler's extension, so a txt request with a `.csv` name
/// still lands as `.txt`.
pub(crate) fn deliver(
    exported: Exported,
    request: &ExportRequest,
    target: &dyn SaveTarget,
) -> Result<ExportOutput, ExportAsError> {
    if request.download {
        let file_name = request
            .file_name
            .as_deref()
            .ok_or(ExportAsError::MissingFileName)?;
        let stem = file_name.split('.').next().unwrap_or(file_name);
        let file_name = format!("{stem}.{}", exported.extension);
        target.save(
            &file_name,
            &Blob {
                mime: exported.mime.to_string(),
                data: exported.data,
            },
        )?;
        Ok(ExportOutput::Saved)
    } else {
        Ok(ExportOutput::DataUrl(encoding::to_data_url(
            exported.mime,
            &exported.data,
        )))
    }
}
