use export_as_rs::export_as_engine::{ExportAsEngine, ExportFormat, ExportRequest};

const TABLE: &str = r#"<table>
  <tr><th>Name</th><th>Age</th></tr>
  <tr><td>Ann</td><td>30</td></tr>
  <tr><td>Ben</td><td>41</td></tr>
</table>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = ExportAsEngine::new();

    let csv = engine.get(&ExportRequest::new(ExportFormat::Csv, TABLE))?;
    println!("csv: {csv:?}");

    let rows = engine.get(&ExportRequest::new(ExportFormat::Json, TABLE))?;
    println!("json rows: {rows:?}");

    // Writes out.xlsx and out.docx into the working directory.
    engine.save(ExportRequest::new(ExportFormat::Xlsx, TABLE), "out")?;
    engine.save(ExportRequest::new(ExportFormat::Docx, TABLE), "out")?;

    Ok(())
}
