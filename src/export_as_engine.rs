use std::{collections::HashMap, str::FromStr};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    download::{FsSaveTarget, SaveTarget},
    error::ExportAsError,
    exporter::{
        Export,
        csv::CsvExporter,
        docx::DocxExporter,
        json::JsonExporter,
        pdf::{PdfExporter, PdfHook},
        png::PngExporter,
        xlsx::XlsxExporter,
        xml::XmlExporter,
    },
};

pub struct ExportAsEngine {
    exporters: HashMap<ExportFormat, Box<dyn Export>>,
    target: Box<dyn SaveTarget>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Png,
    Csv,
    Txt,
    Xls,
    Xlsx,
    Doc,
    Docx,
    Json,
    Xml,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Png => write!(f, "png"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Txt => write!(f, "txt"),
            ExportFormat::Xls => write!(f, "xls"),
            ExportFormat::Xlsx => write!(f, "xlsx"),
            ExportFormat::Doc => write!(f, "doc"),
            ExportFormat::Docx => write!(f, "docx"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Xml => write!(f, "xml"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "png" => Ok(ExportFormat::Png),
            "csv" => Ok(ExportFormat::Csv),
            "txt" => Ok(ExportFormat::Txt),
            "xls" => Ok(ExportFormat::Xls),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "doc" => Ok(ExportFormat::Doc),
            "docx" => Ok(ExportFormat::Docx),
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            _ => Err(format!("Invalid export format: {}", s)),
        }
    }
}

/// Per-request tuning knobs read by individual handlers.
#[derive(Default, Clone)]
pub struct ExportOptions {
    /// Invoked once with the compiled document before PDF serialization.
    pub pdf_hook: Option<PdfHook>,
    /// Worksheet name for spreadsheet exports; defaults to the file name.
    pub sheet_name: Option<String>,
}

/// One unit of export work: the source element's markup plus delivery flags.
pub struct ExportRequest {
    pub format: ExportFormat,
    /// Serialized HTML of the source element. Resolving an element id to its
    /// markup is the embedding application's job.
    pub source: String,
    pub options: ExportOptions,
    /// When set, the result goes to the save target instead of the caller.
    pub download: bool,
    /// Required when `download` is set.
    pub file_name: Option<String>,
}

impl ExportRequest {
    pub fn new(format: ExportFormat, source: impl Into<String>) -> Self {
        Self {
            format,
            source: source.into(),
            options: ExportOptions::default(),
            download: false,
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutput {
    /// `data:<mime>;base64,<content>`; the mime segment always matches the
    /// encoded bytes.
    DataUrl(String),
    /// Structured row data. Only the JSON handler returns this, and only on
    /// the non-download path; every other handler returns `DataUrl`.
    Rows(Vec<Map<String, Value>>),
    /// The payload went to the save target; nothing is returned.
    Saved,
}

impl ExportAsEngine {
    pub fn new() -> Self {
        Self::with_save_target(Box::new(FsSaveTarget::default()))
    }

    pub fn with_save_target(target: Box<dyn SaveTarget>) -> Self {
        let mut engine = Self::bare(target);

        engine.register_exporter(ExportFormat::Pdf, Box::new(PdfExporter::default()));
        engine.register_exporter(ExportFormat::Png, Box::new(PngExporter::default()));
        engine.register_exporter(ExportFormat::Csv, Box::new(CsvExporter::csv()));
        // txt is csv under a text extension, one handler on purpose
        engine.register_exporter(ExportFormat::Txt, Box::new(CsvExporter::txt()));
        // xls and xlsx share one binary layout
        engine.register_exporter(ExportFormat::Xls, Box::new(XlsxExporter::new("xls")));
        engine.register_exporter(ExportFormat::Xlsx, Box::new(XlsxExporter::new("xlsx")));
        engine.register_exporter(ExportFormat::Doc, Box::new(DocxExporter::doc()));
        engine.register_exporter(ExportFormat::Docx, Box::new(DocxExporter::default()));
        engine.register_exporter(ExportFormat::Json, Box::new(JsonExporter::new()));
        engine.register_exporter(ExportFormat::Xml, Box::new(XmlExporter::new()));

        engine
    }

    /// An engine with no handlers registered. Hosts that only need a subset
    /// of formats cherry-pick via `register_exporter`.
    pub fn bare(target: Box<dyn SaveTarget>) -> Self {
        Self {
            exporters: HashMap::new(),
            target,
        }
    }

    pub fn register_exporter(&mut self, format: ExportFormat, exporter: Box<dyn Export>) {
        self.exporters.insert(format, exporter);
    }

    pub fn supported_formats(&self) -> Vec<ExportFormat> {
        let mut formats: Vec<ExportFormat> = self.exporters.keys().cloned().collect();
        formats.sort_by_key(|f| f.to_string());
        formats
    }

    /// Route the request to its format handler. Unregistered formats fail
    /// fast; there is no fallback or partial result.
    pub fn get(&self, request: &ExportRequest) -> Result<ExportOutput, ExportAsError> {
        let exporter = self
            .exporters
            .get(&request.format)
            .ok_or(ExportAsError::UnsupportedFormat(request.format.clone()))?;

        debug!(format = %request.format, download = request.download, "dispatching export");
        exporter.export(request, self.target.as_ref())
    }

    /// Convenience save path: forces `download` and derives the file name as
    /// `<file_name>.<format>`, then dispatches. Identical semantics to
    /// calling `get` with those two fields pre-set.
    pub fn save(
        &self,
        mut request: ExportRequest,
        file_name: &str,
    ) -> Result<ExportOutput, ExportAsError> {
        request.download = true;
        request.file_name = Some(format!("{}.{}", file_name, request.format));
        self.get(&request)
    }
}

impl Default for ExportAsEngine {
    fn default() -> Self {
        Self::new()
    }
}
