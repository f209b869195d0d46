use std::{borrow::Cow, sync::Arc};

use bytes::Bytes;
use typst::layout::PagedDocument;
use typst_as_lib::TypstEngine;
use typst_pdf::PdfOptions;

use crate::{
    download::SaveTarget,
    error::ExportAsError,
    export_as_engine::{ExportOutput, ExportRequest},
    exporter::{Export, Exported, deliver},
    table::TableSnapshot,
};

const PDF_MIME: &'static str = "application/pdf";
const PDF_EXTENSION: &'static str = "pdf";

pub(crate) const DEFAULT_TEMPLATE: &str = r#"
#set page(paper: "a4")
#set text(font: "Liberation Serif", 11pt)


{{content}}
"#;

/// Invoked exactly once with the compiled document before it is serialized.
/// The document is read-only; the hook is for inspection (page counts,
/// metadata capture), not mutation.
pub type PdfHook = Arc<dyn Fn(&PagedDocument) + Send + Sync>;

/// Typst-based PDF exporter: the table markup is laid out as a Typst table
/// and compiled. Template must contain the placeholder `{{content}}`.
pub struct PdfExporter {
    template: String,
    fonts: Vec<&'static [u8]>,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new(None, &[])
    }
}

impl PdfExporter {
    /// - template: Optional template string. If None, a default is used.
    /// - fonts: Optional slice of font byte slices (static). If empty,
    ///   Typst's defaults are used.
    pub fn new<T: Into<Option<String>>>(template: T, fonts: &[&'static [u8]]) -> Self {
        let tmpl = template
            .into()
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());

        Self {
            template: tmpl,
            fonts: fonts.to_vec(),
        }
    }
}

/// Lay the snapshot out as a Typst `#table` call, header cells bold. Rows
/// shorter than the widest row are padded with empty cells.
pub(crate) fn table_to_typst(table: &TableSnapshot) -> String {
    let columns = table.column_count();
    if columns == 0 {
        return String::new();
    }

    let mut out = format!("#table(\n  columns: {columns},\n");
    for row in &table.rows {
        let mut line = String::from("  ");
        for index in 0..columns {
            match row.get(index) {
                Some(cell) if cell.header => {
                    line.push_str(&format!("[*{}*], ", escape_text(&cell.text)))
                }
                Some(cell) => line.push_str(&format!("[{}], ", escape_text(&cell.text))),
                None => line.push_str("[], "),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str(")\n");
    out
}

// Escape characters that would prematurely start Typst constructs inside a
// markup block.
fn escape_text<'a>(s: &'a str) -> Cow<'a, str> {
    const SPECIAL: fn(char) -> bool =
        |c| matches!(c, '{' | '}' | '[' | ']' | '#' | '*' | '_' | '$' | '`');
    if s.chars().any(SPECIAL) {
        let mut out = String::with_capacity(s.len() + 8);
        for ch in s.chars() {
            if SPECIAL(ch) {
                out.push('\\');
            }
            out.push(ch);
        }
        Cow::Owned(out)
    } else {
        Cow::Borrowed(s)
    }
}

/// Shared compile step for the PDF and PNG exporters: parse the table, build
/// the Typst source, compile to a paged document.
pub(crate) fn compile_table_document(
    template: &str,
    fonts: &[&'static [u8]],
    source: &str,
) -> Result<PagedDocument, String> {
    let table = TableSnapshot::parse(source);
    let body = table_to_typst(&table);
    let main_source = template.replacen("{{content}}", &body, 1);

    let mut builder = TypstEngine::builder().main_file(main_source);
    if !fonts.is_empty() {
        builder = builder.fonts(fonts.to_vec());
    }
    let engine = builder.build();

    engine
        .compile()
        .output
        .map_err(|e| format!("Typst output error: {e:?}"))
}

impl Export for PdfExporter {
    fn export(
        &self,
        request: &ExportRequest,
        target: &dyn SaveTarget,
    ) -> Result<ExportOutput, ExportAsError> {
        let doc = compile_table_document(&self.template, &self.fonts, &request.source)
            .map_err(ExportAsError::Pdf)?;

        if let Some(hook) = &request.options.pdf_hook {
            hook(&doc);
        }

        let pdf = typst_pdf::pdf(&doc, &PdfOptions::default())
            .map_err(|e| ExportAsError::Pdf(format!("Typst PDF rendering error: {e:?}")))?;

        deliver(
            Exported {
                data: Bytes::from(pdf),
                mime: PDF_MIME,
                extension: PDF_EXTENSION,
            },
            request,
            target,
        )
    }
}
