use std::io::Cursor;

use bytes::Bytes;
use docx_rs::{
    Docx, Paragraph as DocxParagraph, Run as DocxRun, RunFonts, Table as DocxTable,
    TableCell as DocxTableCell, TableRow as DocxTableRow,
};

use crate::{
    download::SaveTarget,
    error::ExportAsError,
    export_as_engine::{ExportOutput, ExportRequest},
    exporter::{Export, Exported, deliver},
    table::TableSnapshot,
};

const DOCX_MIME: &'static str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Word-document export: the table becomes a real document table, header
/// cells rendered bold.
pub struct DocxExporter {
    default_font_family: String,
    default_font_size: usize, // half-points (22 = 11pt)
    extension: &'static str,
}

impl Default for DocxExporter {
    fn default() -> Self {
        Self {
            default_font_family: "Times New Roman".to_string(),
            default_font_size: 22, // 11pt
            extension: "docx",
        }
    }
}

impl DocxExporter {
    pub fn new(
        default_font_family: String,
        default_font_size: usize,
        extension: &'static str,
    ) -> Self {
        Self {
            default_font_family,
            default_font_size,
            extension,
        }
    }

    /// `doc` shares the docx layout under its own extension.
    pub fn doc() -> Self {
        Self {
            extension: "doc",
            ..Self::default()
        }
    }

    fn cell_paragraph(&self, text: &str, bold: bool) -> DocxParagraph {
        let mut run = DocxRun::new()
            .fonts(RunFonts::new().ascii(&self.default_font_family))
            .size(self.default_font_size)
            .add_text(text);
        if bold {
            run = run.bold();
        }
        DocxParagraph::new().add_run(run)
    }
}

impl Export for DocxExporter {
    fn export(
        &self,
        request: &ExportRequest,
        target: &dyn SaveTarget,
    ) -> Result<ExportOutput, ExportAsError> {
        let table = TableSnapshot::parse(&request.source);

        let rows: Vec<DocxTableRow> = table
            .rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| {
                DocxTableRow::new(
                    row.iter()
                        .map(|cell| {
                            DocxTableCell::new()
                                .add_paragraph(self.cell_paragraph(&cell.text, cell.header))
                        })
                        .collect(),
                )
            })
            .collect();

        let docx = Docx::new().add_table(DocxTable::new(rows));

        let mut cursor = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut cursor)
            .map_err(|err| ExportAsError::Docx(err.to_string()))?;

        deliver(
            Exported {
                data: Bytes::from(cursor.into_inner()),
                mime: DOCX_MIME,
                extension: self.extension,
            },
            request,
            target,
        )
    }
}
