use rust_xlsxwriter::Workbook;

use crate::{
    download::SaveTarget,
    error::ExportAsError,
    export_as_engine::{ExportOutput, ExportRequest},
    exporter::{Export, Exported, deliver},
    table::TableSnapshot,
};

const XLSX_MIME: &'static str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Single-sheet workbook export. One layout serves both the `xls` and `xlsx`
/// tags; only the reported extension differs.
pub struct XlsxExporter {
    extension: &'static str,
}

impl XlsxExporter {
    pub fn new(extension: &'static str) -> Self {
        Self { extension }
    }
}

impl Export for XlsxExporter {
    fn export(
        &self,
        request: &ExportRequest,
        target: &dyn SaveTarget,
    ) -> Result<ExportOutput, ExportAsError> {
        let table = TableSnapshot::parse(&request.source);

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        if let Some(name) = request
            .options
            .sheet_name
            .as_deref()
            .or(request.file_name.as_deref())
        {
            sheet.set_name(name)?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, &cell.text)?;
            }
        }

        let out = workbook.save_to_buffer()?;
        deliver(
            Exported {
                data: out.into(),
                mime: XLSX_MIME,
                extension: self.extension,
            },
            request,
            target,
        )
    }
}
