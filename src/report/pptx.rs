//! PowerPoint (PPTX) deck rendering.
//!
//! Writes a minimal Office Open XML package: one master, one blank layout,
//! a title slide and a "Key Points" slide with one paragraph per line.

use super::ReportLayout;
use crate::error::Result;
use quick_xml::escape::escape;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// 4:3 slide in EMU
const SLIDE_CX: u64 = 9_144_000;
const SLIDE_CY: u64 = 6_858_000;

const CONTENT_TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/><Override PartName="/ppt/slides/slide2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/></Types>"#;

const THEME: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Clipwise"><a:themeElements><a:clrScheme name="Clipwise"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Clipwise"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Clipwise"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

const EMPTY_GROUP: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

/// One text box on a slide.
struct TextBox<'a> {
    id: u32,
    name: &'a str,
    y: u64,
    cy: u64,
    size_pt: u32,
    bold: bool,
    lines: Vec<&'a str>,
}

/// Render `content` as a two-slide deck at `path`.
pub fn render_pptx(content: &str, layout: &ReportLayout, path: &Path) -> Result<()> {
    let title_slide = slide(&[
        TextBox {
            id: 2,
            name: "Title",
            y: 2_130_425,
            cy: 1_470_025,
            size_pt: 40,
            bold: true,
            lines: vec![layout.title.as_str()],
        },
        TextBox {
            id: 3,
            name: "Subtitle",
            y: 3_886_200,
            cy: 1_752_600,
            size_pt: 24,
            bold: false,
            lines: vec![layout.subtitle.as_str()],
        },
    ]);

    let points_slide = slide(&[
        TextBox {
            id: 2,
            name: "Title",
            y: 274_638,
            cy: 1_143_000,
            size_pt: 36,
            bold: true,
            lines: vec!["Key Points"],
        },
        TextBox {
            id: 3,
            name: "Content",
            y: 1_600_200,
            cy: 4_525_963,
            size_pt: 16,
            bold: false,
            lines: content.lines().collect(),
        },
    ]);

    let parts: Vec<(&str, String)> = vec![
        ("[Content_Types].xml", xml(CONTENT_TYPES)),
        (
            "_rels/.rels",
            relationships(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        ),
        ("ppt/presentation.xml", presentation()),
        (
            "ppt/_rels/presentation.xml.rels",
            relationships(&[
                ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
                ("rId2", "slide", "slides/slide1.xml"),
                ("rId3", "slide", "slides/slide2.xml"),
                ("rId4", "theme", "theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideMasters/slideMaster1.xml", slide_master()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            relationships(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml", slide_layout()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            relationships(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        ),
        ("ppt/slides/slide1.xml", title_slide),
        ("ppt/slides/_rels/slide1.xml.rels", slide_relationships()),
        ("ppt/slides/slide2.xml", points_slide),
        ("ppt/slides/_rels/slide2.xml.rels", slide_relationships()),
        ("ppt/theme/theme1.xml", xml(THEME)),
    ];

    let mut zip = ZipWriter::new(File::create(path)?);
    for (name, body) in parts {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    zip.finish()?;

    Ok(())
}

fn xml(body: &str) -> String {
    format!("{}{}", XML_HEADER, body)
}

fn relationships(rels: &[(&str, &str, &str)]) -> String {
    let entries: String = rels
        .iter()
        .map(|(id, kind, target)| {
            format!(
                r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
                id, REL_TYPE, kind, target
            )
        })
        .collect();
    xml(&format!(r#"<Relationships xmlns="{}">{}</Relationships>"#, REL_NS, entries))
}

fn slide_relationships() -> String {
    relationships(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")])
}

fn presentation() -> String {
    xml(&format!(
        r#"<p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst><p:sldSz cx="{SLIDE_CX}" cy="{SLIDE_CY}" type="screen4x3"/><p:notesSz cx="{SLIDE_CY}" cy="{SLIDE_CX}"/></p:presentation>"#
    ))
}

fn slide_master() -> String {
    xml(&format!(
        r#"<p:sldMaster {NS}><p:cSld><p:spTree>{EMPTY_GROUP}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    ))
}

fn slide_layout() -> String {
    xml(&format!(
        r#"<p:sldLayout {NS} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{EMPTY_GROUP}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    ))
}

fn slide(boxes: &[TextBox<'_>]) -> String {
    let shapes: String = boxes.iter().map(text_box).collect();
    xml(&format!(
        r#"<p:sld {NS}><p:cSld><p:spTree>{EMPTY_GROUP}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    ))
}

fn text_box(tb: &TextBox<'_>) -> String {
    let margin_x: u64 = 457_200;
    let cx = SLIDE_CX - 2 * margin_x;
    let bold = if tb.bold { r#" b="1""# } else { "" };

    let paragraphs: String = if tb.lines.is_empty() {
        r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#.to_string()
    } else {
        tb.lines
            .iter()
            .map(|line| {
                format!(
                    r#"<a:p><a:r><a:rPr lang="en-US" sz="{}"{}/><a:t>{}</a:t></a:r></a:p>"#,
                    tb.size_pt * 100,
                    bold,
                    xml_text(line)
                )
            })
            .collect()
    };

    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>"#,
        tb.id, tb.name, margin_x, tb.y, cx, tb.cy, paragraphs
    )
}

/// Escape text for an XML text node, dropping characters XML 1.0 forbids.
fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| *c == '\t' || !c.is_control())
        .collect();
    escape(cleaned.as_str()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_part(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut body = String::new();
        part.read_to_string(&mut body).unwrap();
        body
    }

    #[test]
    fn test_render_pptx_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.pptx");

        render_pptx(
            "user: Transcribe the video\nassistant: cats & <dogs>",
            &ReportLayout::default(),
            &path,
        )
        .unwrap();

        let archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/theme/theme1.xml",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }

        let title = read_part(&path, "ppt/slides/slide1.xml");
        assert!(title.contains("<a:t>Video Analysis Summary</a:t>"));
        assert!(title.contains("<a:t>Auto-generated (local)</a:t>"));

        let points = read_part(&path, "ppt/slides/slide2.xml");
        assert!(points.contains("<a:t>Key Points</a:t>"));
        assert!(points.contains("<a:t>user: Transcribe the video</a:t>"));
        assert!(points.contains("<a:t>assistant: cats &amp; &lt;dogs&gt;</a:t>"));
    }

    #[test]
    fn test_xml_text_drops_control_characters() {
        assert_eq!(xml_text("a\u{0007}b\tc"), "ab\tc");
        assert_eq!(xml_text("\"quoted\""), "&quot;quoted&quot;");
    }
}
