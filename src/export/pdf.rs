//! Paginated document export.
//!
//! The body is word-wrapped to the content width and flowed onto as many
//! pages as it needs. Output uses the standard Type1 fonts, so no font data
//! is embedded and text is encoded as WinAnsi.

use super::{ensure_content, file_name, ExportArtifact, ExportFormat, DEFAULT_TITLE};
use crate::error::ExportError;
use crate::title::format_title;

// Advance widths per 1000 units of em for ' '..='~'
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '..'/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // '0'..'9'
    278, 278, 564, 564, 564, 444, 921, // ':'..'@'
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
    556, 611, 722, 722, 944, 722, 722, 611, // 'A'..'Z'
    333, 278, 333, 469, 500, 333, // '['..'`'
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
    389, 278, 500, 500, 722, 500, 500, 444, // 'a'..'z'
    480, 200, 480, 541, // '{'..'~'
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    TimesRoman,
}

impl Font {
    fn resource_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::TimesRoman => "F2",
        }
    }

    fn base_font(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::TimesRoman => "Times-Roman",
        }
    }

    fn glyph_width(&self, c: char) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::TimesRoman => &TIMES_ROMAN_WIDTHS,
        };
        match c {
            ' '..='~' => table[c as usize - 0x20],
            _ => match self {
                Font::Helvetica => 556,
                Font::TimesRoman => 500,
            },
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.glyph_width(c) as u32).sum();
        units as f32 * size / 1000.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub title_font: Font,
    pub title_size: f32,
    pub body_font: Font,
    pub body_size: f32,
    pub line_spacing: f32,
}

impl Default for PageSetup {
    // A4 portrait, 20 mm margins
    fn default() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 56.69,
            title_font: Font::TimesRoman,
            title_size: 18.0,
            body_font: Font::Helvetica,
            body_size: 11.0,
            line_spacing: 1.15,
        }
    }
}

impl PageSetup {
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

// A line of text at its final position; `y` is the baseline from the page bottom
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    pub font: Font,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageLayout {
    pub setup: PageSetup,
    pub pages: Vec<Page>,
}

/// Greedy word wrap. Words wider than `max_width` are split by character.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if font.text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if font.text_width(word, size) <= max_width {
            current = word.to_string();
            continue;
        }

        for c in word.chars() {
            let mut next = current.clone();
            next.push(c);
            if !current.is_empty() && font.text_width(&next, size) > max_width {
                lines.push(std::mem::replace(&mut current, c.to_string()));
            } else {
                current = next;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// Top-down cursor that opens a new page when a line no longer fits
struct Flow<'a> {
    setup: &'a PageSetup,
    pages: Vec<Page>,
    current: Page,
    cursor: f32,
}

impl<'a> Flow<'a> {
    fn new(setup: &'a PageSetup) -> Self {
        Self {
            setup,
            pages: Vec::new(),
            current: Page::default(),
            cursor: setup.margin,
        }
    }

    fn push(&mut self, text: String, font: Font, size: f32) {
        let bottom = self.setup.height - self.setup.margin;
        // Blank lines advance the cursor too, so a page may fill up with no text on it
        if self.cursor + size > bottom && self.cursor > self.setup.margin {
            self.pages.push(std::mem::take(&mut self.current));
            self.cursor = self.setup.margin;
        }
        let baseline = self.cursor + size;
        self.current.lines.push(PlacedLine {
            font,
            size,
            x: self.setup.margin,
            y: self.setup.height - baseline,
            text,
        });
        self.cursor += size * self.setup.line_spacing;
    }

    fn skip(&mut self, amount: f32) {
        self.cursor += amount;
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Lays out a title line followed by the wrapped body.
pub fn layout(title: &str, content: &str, setup: &PageSetup) -> PageLayout {
    let width = setup.content_width();
    let body_leading = setup.body_size * setup.line_spacing;
    let mut flow = Flow::new(setup);

    for line in wrap_text(title, setup.title_font, setup.title_size, width) {
        flow.push(line, setup.title_font, setup.title_size);
    }
    flow.skip(body_leading);

    for paragraph in content.split('\n') {
        let wrapped = wrap_text(paragraph, setup.body_font, setup.body_size, width);
        if wrapped.is_empty() {
            flow.skip(body_leading);
            continue;
        }
        for line in wrapped {
            flow.push(line, setup.body_font, setup.body_size);
        }
    }

    PageLayout {
        setup: *setup,
        pages: flow.finish(),
    }
}

// Maps a char onto the WinAnsi code page, '?' when it has no slot
fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => b'?',
    }
}

fn push_pdf_string(out: &mut Vec<u8>, text: &str) {
    out.push(b'(');
    for c in text.chars() {
        let byte = win_ansi(c);
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x20..=0x7E => out.push(byte),
            _ => out.extend_from_slice(format!("\\{:03o}", byte).as_bytes()),
        }
    }
    out.push(b')');
}

fn page_stream(page: &Page) -> Vec<u8> {
    let mut stream = Vec::new();
    for line in &page.lines {
        stream.extend_from_slice(
            format!(
                "BT\n/{} {:.2} Tf\n{:.2} {:.2} Td\n",
                line.font.resource_name(),
                line.size,
                line.x,
                line.y
            )
            .as_bytes(),
        );
        push_pdf_string(&mut stream, &line.text);
        stream.extend_from_slice(b" Tj\nET\n");
    }
    stream
}

// Appends `N 0 obj ... endobj` and records its byte offset for the xref table
fn write_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, body: &[u8]) {
    offsets.push(out.len());
    out.extend_from_slice(format!("{} 0 obj\n", offsets.len()).as_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(b"\nendobj\n");
}

/// Serializes a layout as a PDF 1.4 file.
pub fn render(layout: &PageLayout) -> Vec<u8> {
    let setup = &layout.setup;
    let mut out: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    // 1 catalog, 2 page tree, 3-4 fonts, then a (page, contents) pair per page
    let first_page_object = 5;
    let kids: Vec<String> = (0..layout.pages.len())
        .map(|i| format!("{} 0 R", first_page_object + 2 * i))
        .collect();

    write_object(&mut out, &mut offsets, b"<< /Type /Catalog /Pages 2 0 R >>");
    write_object(
        &mut out,
        &mut offsets,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            layout.pages.len()
        )
        .as_bytes(),
    );
    for font in [Font::Helvetica, Font::TimesRoman] {
        write_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            )
            .as_bytes(),
        );
    }

    for (i, page) in layout.pages.iter().enumerate() {
        let contents_object = first_page_object + 2 * i + 1;
        write_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                setup.width, setup.height, contents_object
            )
            .as_bytes(),
        );

        let stream = page_stream(page);
        let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(&stream);
        body.extend_from_slice(b"endstream");
        write_object(&mut out, &mut offsets, &body);
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

pub fn export_pdf(topic: &str, content: &str) -> Result<ExportArtifact, ExportError> {
    ensure_content(content)?;
    let title = if topic.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        format_title(topic)
    };
    let layout = layout(&title, content, &PageSetup::default());
    log::debug!("PDF layout for '{}': {} page(s)", title, layout.pages.len());
    Ok(ExportArtifact {
        file_name: file_name(topic, ExportFormat::Pdf),
        mime_type: ExportFormat::Pdf.mime_type(),
        bytes: render(&layout),
    })
}
