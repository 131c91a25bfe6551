//! PDF summary rendering.

use super::{wrap_text, ReportLayout};
use crate::error::{ClipwiseError, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;

/// Millimetres per PostScript point.
const MM_PER_PT: f32 = 25.4 / 72.0;

const MARGIN_PT: f32 = 72.0;
const TITLE_SIZE_PT: f32 = 16.0;
const TITLE_GAP_PT: f32 = 24.0;
const BODY_SIZE_PT: f32 = 11.0;
const LINE_HEIGHT_PT: f32 = 16.0;

fn pdf_error(e: impl std::fmt::Display) -> ClipwiseError {
    ClipwiseError::Report(format!("PDF error: {e}"))
}

/// Render `content` as an A4 PDF at `path`.
///
/// Each line of `content` is word-wrapped separately; pages break when the
/// cursor reaches the bottom margin.
pub fn render_pdf(content: &str, layout: &ReportLayout, path: &Path) -> Result<()> {
    let (doc, page1, layer1) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

    let margin = MARGIN_PT * MM_PER_PT;
    let top = PAGE_HEIGHT_MM - margin;
    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = top;

    layer.use_text(layout.title.as_str(), TITLE_SIZE_PT, Mm(margin), Mm(y), &bold);
    y -= TITLE_GAP_PT * MM_PER_PT;

    for line in content.lines().flat_map(|l| wrap_text(l, layout.wrap_width)) {
        if y < margin {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = top;
        }
        layer.use_text(line, BODY_SIZE_PT, Mm(margin), Mm(y), &font);
        y -= LINE_HEIGHT_PT * MM_PER_PT;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    doc.save(&mut writer).map_err(pdf_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.pdf");

        render_pdf(
            "user: Transcribe the video\nassistant: hello world",
            &ReportLayout::default(),
            &path,
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_pdf_spills_onto_new_pages() {
        let dir = tempfile::tempdir().unwrap();
        let short = dir.path().join("short.pdf");
        let long = dir.path().join("long.pdf");

        render_pdf("one line", &ReportLayout::default(), &short).unwrap();
        let content = (0..200)
            .map(|i| format!("assistant: line number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        render_pdf(&content, &ReportLayout::default(), &long).unwrap();

        let short_len = std::fs::metadata(&short).unwrap().len();
        let long_len = std::fs::metadata(&long).unwrap().len();
        assert!(long_len > short_len);
    }
}
