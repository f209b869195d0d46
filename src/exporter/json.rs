use serde_json::{Map, Value};

use crate::{
    download::SaveTarget,
    error::ExportAsError,
    export_as_engine::{ExportOutput, ExportRequest},
    exporter::{Export, Exported, deliver},
    table::TableSnapshot,
};

const JSON_MIME: &'static str = "text/json";
const JSON_EXTENSION: &'static str = "json";

/// Row-object export: the first table row supplies the keys (lower-cased
/// inner markup with spaces stripped), every later row becomes one object
/// mapping those keys to cell markup.
pub struct JsonExporter;

impl JsonExporter {
    pub fn new() -> Self {
        Self {}
    }
}

impl Export for JsonExporter {
    fn export(
        &self,
        request: &ExportRequest,
        target: &dyn SaveTarget,
    ) -> Result<ExportOutput, ExportAsError> {
        let table = TableSnapshot::parse(&request.source);
        let mut rows = table.rows.iter();

        let headers: Vec<String> = rows
            .next()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.inner_html.to_lowercase().replace(' ', ""))
                    .collect()
            })
            .unwrap_or_default();

        let mut data = Vec::new();
        for row in rows {
            let mut record = Map::new();
            for (header, cell) in headers.iter().zip(row) {
                record.insert(header.clone(), Value::String(cell.inner_html.clone()));
            }
            data.push(record);
        }

        if request.download {
            let json = serde_json::to_string(&data)?;
            deliver(
                Exported {
                    data: json.into(),
                    mime: JSON_MIME,
                    extension: JSON_EXTENSION,
                },
                request,
                target,
            )
        } else {
            // Unlike every other handler, the direct-return path yields the
            // structured rows rather than an encoded payload.
            Ok(ExportOutput::Rows(data))
        }
    }
}
