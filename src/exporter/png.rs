use std::io::Cursor;

use bytes::Bytes;
use derive_new::new;
use image::{ImageFormat, RgbaImage};

use crate::{
    download::SaveTarget,
    error::ExportAsError,
    export_as_engine::{ExportOutput, ExportRequest},
    exporter::{Export, Exported, deliver, pdf},
};

const PNG_MIME: &'static str = "image/png";
const PNG_EXTENSION: &'static str = "png";
const DEFAULT_PIXELS_PER_PT: f32 = 2.0;

/// Raster export: the table is laid out with the same Typst pipeline as the
/// PDF exporter, then the first page is rendered to a PNG.
#[derive(new)]
pub struct PngExporter {
    template: String,
    fonts: Vec<&'static [u8]>,
    pixels_per_pt: f32,
}

impl Default for PngExporter {
    fn default() -> Self {
        Self::new(
            pdf::DEFAULT_TEMPLATE.to_string(),
            Vec::new(),
            DEFAULT_PIXELS_PER_PT,
        )
    }
}

impl Export for PngExporter {
    fn export(
        &self,
        request: &ExportRequest,
        target: &dyn SaveTarget,
    ) -> Result<ExportOutput, ExportAsError> {
        let doc = pdf::compile_table_document(&self.template, &self.fonts, &request.source)
            .map_err(ExportAsError::Png)?;

        let page = doc
            .pages
            .first()
            .ok_or_else(|| ExportAsError::Png("document has no pages".to_string()))?;

        let pixmap = typst_render::render(page, self.pixels_per_pt);
        let raster = RgbaImage::from_raw(pixmap.width(), pixmap.height(), pixmap.take())
            .ok_or_else(|| ExportAsError::Png("pixel buffer size mismatch".to_string()))?;

        let mut out = Cursor::new(Vec::new());
        raster
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| ExportAsError::Png(e.to_string()))?;

        deliver(
            Exported {
                data: Bytes::from(out.into_inner()),
                mime: PNG_MIME,
                extension: PNG_EXTENSION,
            },
            request,
            target,
        )
    }
}
