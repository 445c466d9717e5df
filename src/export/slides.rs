//! Slide deck export: a title slide, then one slide per paragraph.
//!
//! Paragraph text is placed as-is in a fixed text box. Nothing is re-flowed,
//! truncated or shrunk, so a long paragraph can overflow its box.

use super::{ensure_content, file_name, ExportArtifact, ExportFormat, DEFAULT_TITLE};
use crate::error::ExportError;
use crate::title::format_title;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

// 16:9 in EMU
const SLIDE_WIDTH: i64 = 12_192_000;
const SLIDE_HEIGHT: i64 = 6_858_000;
const TITLE_FONT_SIZE: u32 = 4400;
const BODY_FONT_SIZE: u32 = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

pub const TITLE_BOX: TextBox = TextBox {
    x: 914_400,
    y: 2_286_000,
    width: 10_363_200,
    height: 1_828_800,
};

pub const BODY_BOX: TextBox = TextBox {
    x: 914_400,
    y: 914_400,
    width: 10_363_200,
    height: 5_029_200,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slide {
    Title(String),
    Body(String),
}

impl Slide {
    pub fn text(&self) -> &str {
        match self {
            Slide::Title(text) | Slide::Body(text) => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlideDeck {
    pub slides: Vec<Slide>,
}

/// Builds the slide sequence: the formatted topic, then every non-blank
/// line of `content` as its own slide.
pub fn build_deck(topic: &str, content: &str) -> SlideDeck {
    let title = if topic.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        format_title(topic)
    };

    let mut slides = vec![Slide::Title(title)];
    slides.extend(
        content
            .split('\n')
            .map(|p| p.trim_end_matches('\r'))
            .filter(|p| !p.trim().is_empty())
            .map(|p| Slide::Body(p.to_string())),
    );
    SlideDeck { slides }
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 has no encoding for the remaining control characters
            '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const EMPTY_TREE: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

fn slide_xml(slide: &Slide) -> String {
    let (frame, size, bold, align) = match slide {
        Slide::Title(_) => (TITLE_BOX, TITLE_FONT_SIZE, r#" b="1""#, r#"<a:pPr algn="ctr"/>"#),
        Slide::Body(_) => (BODY_BOX, BODY_FONT_SIZE, "", ""),
    };
    format!(
        concat!(
            "{header}<p:sld {ns}><p:cSld><p:spTree>{tree}",
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox 1"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:noAutofit/></a:bodyPr><a:lstStyle/>"#,
            r#"<a:p>{align}<a:r><a:rPr lang="id-ID" sz="{size}"{bold} dirty="0"/><a:t>{text}</a:t></a:r></a:p>"#,
            "</p:txBody></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
        ),
        header = XML_HEADER,
        ns = NS,
        tree = EMPTY_TREE,
        x = frame.x,
        y = frame.y,
        cx = frame.width,
        cy = frame.height,
        align = align,
        size = size,
        bold = bold,
        text = xml_escape(slide.text()),
    )
}

fn content_types_xml(slide_count: usize) -> String {
    let slides: String = (1..=slide_count)
        .map(|n| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                n
            )
        })
        .collect();
    format!(
        concat!(
            "{}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
            r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
            r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
            r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
            "{}</Types>"
        ),
        XML_HEADER, slides
    )
}

fn relationships_xml(entries: &[(String, &str, String)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, kind, target)| {
            format!(
                r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/{}" Target="{}"/>"#,
                id, kind, target
            )
        })
        .collect();
    format!(
        r#"{}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        XML_HEADER, body
    )
}

const REL_OFFICE_DOCUMENT: &str = "officeDocument/2006/relationships/officeDocument";
const REL_SLIDE_MASTER: &str = "officeDocument/2006/relationships/slideMaster";
const REL_SLIDE_LAYOUT: &str = "officeDocument/2006/relationships/slideLayout";
const REL_SLIDE: &str = "officeDocument/2006/relationships/slide";
const REL_THEME: &str = "officeDocument/2006/relationships/theme";

fn presentation_xml(slide_count: usize) -> String {
    // Slide relationships start after the master (rId1) and theme (rId2)
    let ids: String = (0..slide_count)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 3))
        .collect();
    format!(
        concat!(
            "{}<p:presentation {}>",
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            "<p:sldIdLst>{}</p:sldIdLst>",
            r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
            "</p:presentation>"
        ),
        XML_HEADER, NS, ids, SLIDE_WIDTH, SLIDE_HEIGHT
    )
}

fn slide_master_xml() -> String {
    format!(
        concat!(
            "{}<p:sldMaster {}><p:cSld><p:spTree>{}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "</p:sldMaster>"
        ),
        XML_HEADER, NS, EMPTY_TREE
    )
}

fn slide_layout_xml() -> String {
    format!(
        concat!(
            r#"{}<p:sldLayout {} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        XML_HEADER, NS, EMPTY_TREE
    )
}

fn theme_xml() -> String {
    let solid = |v: &str| format!(r#"<a:solidFill><a:schemeClr val="{}"/></a:solidFill>"#, v);
    let line = format!(r#"<a:ln w="9525">{}</a:ln>"#, solid("phClr"));
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    format!(
        concat!(
            r#"{}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements>"#,
            r#"<a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
            r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
            r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
            r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
            r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
            r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>"#,
            r#"<a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#,
            r#"<a:fmtScheme name="Office"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>"#,
            "<a:lnStyleLst>{line}{line}{line}</a:lnStyleLst>",
            "<a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst>",
            "<a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme>",
            "</a:themeElements></a:theme>"
        ),
        XML_HEADER,
        fill = solid("phClr"),
        line = line,
        effect = effect,
    )
}

/// Packs the deck into a .pptx container.
pub fn render_pptx(deck: &SlideDeck) -> Result<Vec<u8>, ExportError> {
    let count = deck.slides.len();
    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".into(), content_types_xml(count)),
        (
            "_rels/.rels".into(),
            relationships_xml(&[("rId1".into(), REL_OFFICE_DOCUMENT, "ppt/presentation.xml".into())]),
        ),
        ("ppt/presentation.xml".into(), presentation_xml(count)),
    ];

    let mut presentation_rels = vec![
        ("rId1".to_string(), REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml".to_string()),
        ("rId2".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
    ];
    for n in 1..=count {
        presentation_rels.push((format!("rId{}", n + 2), REL_SLIDE, format!("slides/slide{}.xml", n)));
    }
    parts.push(("ppt/_rels/presentation.xml.rels".into(), relationships_xml(&presentation_rels)));

    parts.push(("ppt/slideMasters/slideMaster1.xml".into(), slide_master_xml()));
    parts.push((
        "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
        relationships_xml(&[
            ("rId1".into(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".into()),
            ("rId2".into(), REL_THEME, "../theme/theme1.xml".into()),
        ]),
    ));
    parts.push(("ppt/slideLayouts/slideLayout1.xml".into(), slide_layout_xml()));
    parts.push((
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels".into(),
        relationships_xml(&[("rId1".into(), REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml".into())]),
    ));
    parts.push(("ppt/theme/theme1.xml".into(), theme_xml()));

    for (i, slide) in deck.slides.iter().enumerate() {
        let n = i + 1;
        parts.push((format!("ppt/slides/slide{}.xml", n), slide_xml(slide)));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", n),
            relationships_xml(&[("rId1".into(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".into())]),
        ));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, xml) in parts {
        zip.start_file(name, options)?;
        zip.write_all(xml.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

pub fn export_slides(topic: &str, content: &str) -> Result<ExportArtifact, ExportError> {
    ensure_content(content)?;
    let deck = build_deck(topic, content);
    log::debug!("Slide deck for '{}': {} slide(s)", topic, deck.slides.len());
    Ok(ExportArtifact {
        file_name: file_name(topic, ExportFormat::Slides),
        mime_type: ExportFormat::Slides.mime_type(),
        bytes: render_pptx(&deck)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn one_slide_per_non_blank_paragraph() {
        let deck = build_deck("materi untuk pemula", "Satu\n\n   \nDua\r\nTiga");
        assert_eq!(
            deck.slides,
            vec![
                Slide::Title("Materi untuk Pemula".into()),
                Slide::Body("Satu".into()),
                Slide::Body("Dua".into()),
                Slide::Body("Tiga".into()),
            ]
        );
    }

    #[test]
    fn paragraph_text_is_not_trimmed_or_cut() {
        let long = format!("  {}", "kata ".repeat(500));
        let deck = build_deck("Topik", &long);
        assert_eq!(deck.slides[1], Slide::Body(long.clone()));
    }

    #[test]
    fn blank_topic_gets_default_title() {
        let deck = build_deck("", "isi");
        assert_eq!(deck.slides[0], Slide::Title(DEFAULT_TITLE.into()));
    }

    #[test]
    fn escapes_markup_in_slide_text() {
        let xml = slide_xml(&Slide::Body("A & B <c> \"d\"".into()));
        assert!(xml.contains("<a:t>A &amp; B &lt;c&gt; &quot;d&quot;</a:t>"));
    }

    #[test]
    fn pptx_contains_every_slide_part() {
        let deck = build_deck("Fotosintesis", "Paragraf satu\nParagraf dua");
        let bytes = render_pptx(&deck).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        for name in [
            "[Content_Types].xml",
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/slide3.xml",
            "ppt/theme/theme1.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing {}", name);
        }
        assert!(archive.by_name("ppt/slides/slide4.xml").is_err());

        let mut title = String::new();
        archive
            .by_name("ppt/slides/slide1.xml")
            .unwrap()
            .read_to_string(&mut title)
            .unwrap();
        assert!(title.contains(r#"sz="4400" b="1""#));
        assert!(title.contains("<a:t>Fotosintesis</a:t>"));
    }

    #[test]
    fn export_refuses_empty_content() {
        assert!(matches!(export_slides("Topik", ""), Err(ExportError::EmptyContent)));
    }
}
