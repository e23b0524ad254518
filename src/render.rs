//! Document renderer adapter
//!
//! The only point of contact with PDF generation: markdown in, PDF bytes out,
//! all-or-nothing. The markdown event stream is flattened into styled lines
//! and laid out onto A4 pages with the builtin Helvetica fonts.

use crate::error::AppError;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use pulldown_cmark::{Event, Parser, Tag};

/// A4 page width in millimetres
const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 page height in millimetres
const PAGE_HEIGHT_MM: f32 = 297.0;
/// Page margin in millimetres
const MARGIN_MM: f32 = 20.0;
/// Body font size in points
const BODY_SIZE: f32 = 11.0;

/// Typed interface over the PDF-generation capability
///
/// Synchronous from the caller's perspective; no partial output.
pub trait DocumentRenderer: Send + Sync {
    /// Render a markdown document to PDF bytes
    fn render(&self, markdown: &str) -> Result<Vec<u8>, AppError>;
}

/// One laid-out line of text with its style
struct StyledLine {
    text: String,
    size: f32,
    bold: bool,
    /// Extra vertical gap after this line, in millimetres
    space_after: f32,
}

/// In-process markdown-to-PDF renderer
pub struct PdfRenderer;

impl PdfRenderer {
    /// Create a new renderer
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, markdown: &str) -> Result<Vec<u8>, AppError> {
        let lines = layout_lines(markdown);

        let (doc, first_page, first_layer) = PdfDocument::new(
            "Study Notes",
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Render(format!("failed to load font: {}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Render(format!("failed to load font: {}", e)))?;

        let mut layer = doc.get_page(first_page).get_layer(first_layer);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

        for line in lines {
            // Point-to-millimetre line height with a 1.3 leading factor.
            let line_height = line.size * 1.3 * 0.3528;
            if y - line_height < MARGIN_MM {
                let (page, new_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                layer = doc.get_page(page).get_layer(new_layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }
            if !line.text.is_empty() {
                let font: &IndirectFontRef = if line.bold { &bold } else { &regular };
                layer.use_text(line.text, line.size, Mm(MARGIN_MM), Mm(y), font);
            }
            y -= line_height + line.space_after;
        }

        doc.save_to_bytes()
            .map_err(|e| AppError::Render(format!("failed to serialize PDF: {}", e)))
    }
}

/// Flatten a markdown document into styled, wrapped lines.
///
/// Headings are sized by level and set in bold; emphasis markers inside
/// paragraphs are dropped and their text kept inline. An empty document
/// produces zero lines and therefore a single blank page.
fn layout_lines(markdown: &str) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    let mut buffer = String::new();
    let mut size = BODY_SIZE;
    let mut bold = false;

    let mut flush = |buffer: &mut String, size: f32, bold: bool, space_after: f32| {
        let text = buffer.trim();
        if !text.is_empty() {
            for wrapped in wrap_text(text, max_chars_for(size)) {
                lines.push(StyledLine {
                    text: wrapped,
                    size,
                    bold,
                    space_after: 0.0,
                });
            }
            if let Some(last) = lines.last_mut() {
                last.space_after = space_after;
            }
        }
        buffer.clear();
    };

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                flush(&mut buffer, size, bold, 2.0);
                size = match level as usize {
                    1 => 16.0,
                    2 => 14.0,
                    _ => 12.0,
                };
                bold = true;
            }
            Event::End(Tag::Heading(..)) => {
                flush(&mut buffer, size, bold, 3.0);
                size = BODY_SIZE;
                bold = false;
            }
            Event::End(Tag::Paragraph) => {
                flush(&mut buffer, size, bold, 2.5);
            }
            Event::Start(Tag::Item) => {
                flush(&mut buffer, size, bold, 0.5);
                buffer.push_str("- ");
            }
            Event::End(Tag::Item) => {
                flush(&mut buffer, size, bold, 0.5);
            }
            Event::Text(text) | Event::Code(text) => {
                buffer.push_str(&text);
            }
            Event::SoftBreak => buffer.push(' '),
            Event::HardBreak => flush(&mut buffer, size, bold, 0.0),
            Event::Rule => flush(&mut buffer, size, bold, 4.0),
            _ => {}
        }
    }
    flush(&mut buffer, size, bold, 0.0);
    lines
}

/// Rough character budget per line for a given font size (Helvetica average
/// glyph width over the printable A4 width).
fn max_chars_for(size: f32) -> usize {
    let usable_points = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / 0.3528;
    ((usable_points / (size * 0.5)) as usize).max(16)
}

/// Greedy word wrap; words longer than the budget get a line of their own.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_produces_pdf_bytes() {
        let renderer = PdfRenderer::new();
        let bytes = renderer
            .render("**Question 1:** What is entropy?\n\n**Answer:** A measure of disorder.\n\n\n")
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_markdown_still_valid_pdf() {
        let renderer = PdfRenderer::new();
        let bytes = renderer.render("").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_long_document_paginates() {
        let block = "**Question 1:** Explain the principles of effectuation. \
                     **Answer:** A long answer paragraph. "
            .repeat(200);
        let renderer = PdfRenderer::new();
        let bytes = renderer.render(&block).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // More content than fits one page must not error or truncate to nothing.
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_render_headings_and_lists() {
        let markdown = "# Paper\n\n## Section A\n\n- first item\n- second item\n\nBody text.";
        let renderer = PdfRenderer::new();
        let bytes = renderer.render(markdown).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_wrap_text_respects_budget() {
        let wrapped = wrap_text("one two three four five six", 9);
        assert!(wrapped.iter().all(|line| line.chars().count() <= 9));
        assert_eq!(wrapped.join(" "), "one two three four five six");
    }

    #[test]
    fn test_wrap_text_oversized_word() {
        let wrapped = wrap_text("tiny incomprehensibilities tiny", 10);
        assert_eq!(wrapped[1], "incomprehensibilities");
    }

    #[test]
    fn test_layout_empty_document_has_no_lines() {
        assert!(layout_lines("").is_empty());
    }
}
