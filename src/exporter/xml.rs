use std::fmt::Write as _;

use crate::{
    download::SaveTarget,
    error::ExportAsError,
    export_as_engine::{ExportOutput, ExportRequest},
    exporter::{Export, Exported, deliver},
    table::TableSnapshot,
};

const XML_MIME: &'static str = "text/xml";
const XML_EXTENSION: &'static str = "xml";

/// Fixed-envelope XML export: each row with at least one cell becomes a
/// `<Class>` element named after its first cell, remaining cells become
/// `<data>` children, all wrapped in `<Root><Classes>`.
pub struct XmlExporter;

impl XmlExporter {
    pub fn new() -> Self {
        Self {}
    }
}

impl Export for XmlExporter {
    fn export(
        &self,
        request: &ExportRequest,
        target: &dyn SaveTarget,
    ) -> Result<ExportOutput, ExportAsError> {
        let table = TableSnapshot::parse(&request.source);
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Root><Classes>");

        for row in &table.rows {
            let Some((first, rest)) = row.split_first() else {
                continue;
            };
            // Attribute and text content are not entity-escaped.
            let _ = writeln!(xml, "<Class name=\"{}\">", first.text);
            for cell in rest {
                let _ = writeln!(xml, "\t<data>{}</data>", cell.text);
            }
            xml.push_str("</Class>\n");
        }

        xml.push_str("</Classes></Root>");
        deliver(
            Exported {
                data: xml.into(),
                mime: XML_MIME,
                extension: XML_EXTENSION,
            },
            request,
            target,
        )
    }
}
