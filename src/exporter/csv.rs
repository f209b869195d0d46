use crate::{
    download::SaveTarget,
    error::ExportAsError,
    export_as_engine::{ExportOutput, ExportRequest},
    exporter::{Export, Exported, deliver},
    table::TableSnapshot,
};

const CSV_MIME: &'static str = "text/csv";

/// Comma-separated export of the table's visible text, every cell wrapped in
/// double quotes. Also serves the `txt` tag: identical content under a text
/// extension.
pub struct CsvExporter {
    extension: &'static str,
}

impl CsvExporter {
    pub fn csv() -> Self {
        Self { extension: "csv" }
    }

    pub fn txt() -> Self {
        Self { extension: "txt" }
    }
}

impl Export for CsvExporter {
    fn export(
        &self,
        request: &ExportRequest,
        target: &dyn SaveTarget,
    ) -> Result<ExportOutput, ExportAsError> {
        let table = TableSnapshot::parse(&request.source);
        let lines: Vec<String> = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| format!("\"{}\"", cell.text))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();

        // Embedded double quotes are not escaped.
        deliver(
            Exported {
                data: lines.join("\n").into(),
                mime: CSV_MIME,
                extension: self.extension,
            },
            request,
            target,
        )
    }
}
