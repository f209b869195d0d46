use std::{
    collections::HashMap,
    str::FromStr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use export_as_rs::{
    download::{Blob, SaveTarget},
    encoding,
    error::ExportAsError,
    export_as_engine::{ExportAsEngine, ExportFormat, ExportOutput, ExportRequest},
    exporter::pdf::PdfHook,
};

const TABLE: &str = "<table>\
    <tr><th>Name</th><th>Age</th></tr>\
    <tr><td>Ann</td><td>30</td></tr>\
    </table>";

#[derive(Default, Clone)]
struct MemorySaveTarget {
    files: Arc<Mutex<HashMap<String, Blob>>>,
}

impl MemorySaveTarget {
    fn saved(&self, file_name: &str) -> Option<Blob> {
        self.files.lock().unwrap().get(file_name).cloned()
    }

    fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl SaveTarget for MemorySaveTarget {
    fn save(&self, file_name: &str, blob: &Blob) -> Result<(), ExportAsError> {
        self.files
            .lock()
            .unwrap()
            .insert(file_name.to_string(), blob.clone());
        Ok(())
    }
}

fn engine_with_memory() -> (ExportAsEngine, MemorySaveTarget) {
    let target = MemorySaveTarget::default();
    let engine = ExportAsEngine::with_save_target(Box::new(target.clone()));
    (engine, target)
}

fn data_url(output: ExportOutput) -> String {
    match output {
        ExportOutput::DataUrl(url) => url,
        other => panic!("expected a data URL, got {other:?}"),
    }
}

#[test]
fn csv_returns_quoted_cells_under_the_csv_mime() {
    let (engine, _) = engine_with_memory();
    let url = data_url(
        engine
            .get(&ExportRequest::new(ExportFormat::Csv, TABLE))
            .unwrap(),
    );

    assert!(url.starts_with("data:text/csv;base64,"));
    let blob = encoding::content_to_blob(&url).unwrap();
    assert_eq!(blob.mime, "text/csv");
    assert_eq!(blob.data.as_ref(), b"\"Name\",\"Age\"\n\"Ann\",\"30\"");
}

#[test]
fn csv_output_is_stable_across_invocations() {
    let (engine, _) = engine_with_memory();
    let first = engine
        .get(&ExportRequest::new(ExportFormat::Csv, TABLE))
        .unwrap();
    let second = engine
        .get(&ExportRequest::new(ExportFormat::Csv, TABLE))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn txt_content_is_byte_identical_to_csv() {
    let (engine, target) = engine_with_memory();
    engine
        .save(ExportRequest::new(ExportFormat::Csv, TABLE), "report")
        .unwrap();
    engine
        .save(ExportRequest::new(ExportFormat::Txt, TABLE), "report")
        .unwrap();

    let csv = target.saved("report.csv").unwrap();
    let txt = target.saved("report.txt").unwrap();
    assert_eq!(csv.data, txt.data);
    assert_eq!(csv.mime, txt.mime);
}

#[test]
fn txt_download_renames_a_csv_file_name() {
    let (engine, target) = engine_with_memory();
    let mut request = ExportRequest::new(ExportFormat::Txt, TABLE);
    request.download = true;
    request.file_name = Some("report.csv".to_string());
    engine.get(&request).unwrap();

    assert!(target.saved("report.csv").is_none());
    let blob = target.saved("report.txt").unwrap();
    assert_eq!(blob.mime, "text/csv");
}

#[test]
fn xml_wraps_rows_in_the_fixed_envelope() {
    let (engine, _) = engine_with_memory();
    let url = data_url(
        engine
            .get(&ExportRequest::new(ExportFormat::Xml, TABLE))
            .unwrap(),
    );

    assert!(url.starts_with("data:text/xml;base64,"));
    let blob = encoding::content_to_blob(&url).unwrap();
    let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Root><Classes>\
        <Class name=\"Name\">\n\t<data>Age</data>\n</Class>\n\
        <Class name=\"Ann\">\n\t<data>30</data>\n</Class>\n\
        </Classes></Root>";
    assert_eq!(std::str::from_utf8(&blob.data).unwrap(), expected);
}

#[test]
fn xml_output_is_stable_across_invocations() {
    let (engine, _) = engine_with_memory();
    let first = engine
        .get(&ExportRequest::new(ExportFormat::Xml, TABLE))
        .unwrap();
    let second = engine
        .get(&ExportRequest::new(ExportFormat::Xml, TABLE))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn json_returns_structured_rows_when_not_downloading() {
    let (engine, _) = engine_with_memory();
    let output = engine
        .get(&ExportRequest::new(ExportFormat::Json, TABLE))
        .unwrap();

    let ExportOutput::Rows(rows) = output else {
        panic!("expected structured rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Ann");
    assert_eq!(rows[0]["age"], "30");
}

#[test]
fn json_download_encodes_the_same_rows_as_text_json() {
    let (engine, target) = engine_with_memory();
    engine
        .save(ExportRequest::new(ExportFormat::Json, TABLE), "people")
        .unwrap();

    let blob = target.saved("people.json").unwrap();
    assert_eq!(blob.mime, "text/json");
    assert_eq!(
        std::str::from_utf8(&blob.data).unwrap(),
        r#"[{"name":"Ann","age":"30"}]"#
    );
}

#[test]
fn save_matches_a_manually_prepared_download_request() {
    let (engine, target) = engine_with_memory();
    engine
        .save(ExportRequest::new(ExportFormat::Csv, TABLE), "report")
        .unwrap();

    let mut request = ExportRequest::new(ExportFormat::Csv, TABLE);
    request.download = true;
    request.file_name = Some("manual.csv".to_string());
    engine.get(&request).unwrap();

    let saved = target.saved("report.csv").unwrap();
    let manual = target.saved("manual.csv").unwrap();
    assert_eq!(saved, manual);
}

#[test]
fn xlsx_saves_a_zip_container_under_the_spreadsheet_mime() {
    let (engine, target) = engine_with_memory();
    let output = engine
        .save(ExportRequest::new(ExportFormat::Xlsx, TABLE), "report")
        .unwrap();
    assert_eq!(output, ExportOutput::Saved);

    let blob = target.saved("report.xlsx").unwrap();
    assert_eq!(
        blob.mime,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(&blob.data[..4], b"PK\x03\x04");
}

#[test]
fn xls_and_xlsx_share_one_binary_layout() {
    let (engine, _) = engine_with_memory();
    let xls = data_url(
        engine
            .get(&ExportRequest::new(ExportFormat::Xls, TABLE))
            .unwrap(),
    );
    let xlsx = data_url(
        engine
            .get(&ExportRequest::new(ExportFormat::Xlsx, TABLE))
            .unwrap(),
    );

    let xls_mime = encoding::content_to_blob(&xls).unwrap().mime;
    let xlsx_mime = encoding::content_to_blob(&xlsx).unwrap().mime;
    assert_eq!(xls_mime, xlsx_mime);
}

#[test]
fn docx_produces_a_zip_container() {
    let (engine, _) = engine_with_memory();
    let url = data_url(
        engine
            .get(&ExportRequest::new(ExportFormat::Docx, TABLE))
            .unwrap(),
    );

    let blob = encoding::content_to_blob(&url).unwrap();
    assert_eq!(
        blob.mime,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(&blob.data[..2], b"PK");
}

#[test]
fn doc_aliases_the_docx_handler() {
    let (engine, _) = engine_with_memory();
    let url = data_url(
        engine
            .get(&ExportRequest::new(ExportFormat::Doc, TABLE))
            .unwrap(),
    );
    assert!(url.starts_with(
        "data:application/vnd.openxmlformats-officedocument.wordprocessingml.document;base64,"
    ));
}

#[test]
fn pdf_returns_a_pdf_data_url() {
    let (engine, _) = engine_with_memory();
    let url = data_url(
        engine
            .get(&ExportRequest::new(ExportFormat::Pdf, TABLE))
            .unwrap(),
    );
    assert!(url.starts_with("data:application/pdf;base64,"));
}

#[test]
fn png_returns_a_png_data_url() {
    let (engine, _) = engine_with_memory();
    let url = data_url(
        engine
            .get(&ExportRequest::new(ExportFormat::Png, TABLE))
            .unwrap(),
    );
    assert!(url.starts_with("data:image/png;base64,"));

    let blob = encoding::content_to_blob(&url).unwrap();
    assert_eq!(&blob.data[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn pdf_hook_runs_exactly_once_before_serialization() {
    let (engine, _) = engine_with_memory();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut request = ExportRequest::new(ExportFormat::Pdf, TABLE);
    let counter = Arc::clone(&calls);
    let hook: PdfHook = Arc::new(move |doc| {
        assert!(!doc.pages.is_empty());
        counter.fetch_add(1, Ordering::SeqCst);
    });
    request.options.pdf_hook = Some(hook);

    let url = data_url(engine.get(&request).unwrap());
    assert!(url.starts_with("data:application/pdf;base64,"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_tag_strings_do_not_parse() {
    assert!(ExportFormat::from_str("foo").is_err());
    assert_eq!(ExportFormat::from_str("CSV"), Ok(ExportFormat::Csv));
    assert_eq!(ExportFormat::from_str("XlSx"), Ok(ExportFormat::Xlsx));
}

#[test]
fn unregistered_format_fails_fast_without_side_effects() {
    let target = MemorySaveTarget::default();
    let engine = ExportAsEngine::bare(Box::new(target.clone()));

    let mut request = ExportRequest::new(ExportFormat::Csv, TABLE);
    request.download = true;
    request.file_name = Some("report.csv".to_string());

    let err = engine.get(&request).unwrap_err();
    assert!(matches!(err, ExportAsError::UnsupportedFormat(_)));
    assert_eq!(target.len(), 0);
}

#[test]
fn download_without_a_file_name_is_rejected() {
    let (engine, target) = engine_with_memory();
    let mut request = ExportRequest::new(ExportFormat::Csv, TABLE);
    request.download = true;

    let err = engine.get(&request).unwrap_err();
    assert!(matches!(err, ExportAsError::MissingFileName));
    assert_eq!(target.len(), 0);
}

#[test]
fn default_engine_registers_all_ten_formats() {
    let (engine, _) = engine_with_memory();
    assert_eq!(engine.supported_formats().len(), 10);
}
