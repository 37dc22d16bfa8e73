//! Paginated PDF rendering for issued declaration letters.

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::metrics::{mm_to_pt, pt_to_mm, LetterFont};

/// Content of one declaration letter, already placeholder-substituted.
#[derive(Debug, Clone)]
pub struct Letter {
    pub title: String,
    pub body: String,
    pub footer: String,
}

/// Page geometry and typography for issued letters. Millimeters throughout.
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    /// Reserved band at the foot of every page; the letterhead is drawn
    /// inside it, so body text never reaches it.
    pub margin_bottom: f32,
    /// Distance between the top margin and the title baseline.
    pub title_offset: f32,
    pub line_height: f32,
    pub paragraph_indent: f32,
    pub title_size: f32,
    pub body_size: f32,
    pub footer_size: f32,
    pub letterhead_size: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin_left: 25.0,
            margin_right: 20.0,
            margin_top: 30.0,
            margin_bottom: 30.0,
            title_offset: 25.0,
            line_height: 7.0,
            paragraph_indent: 12.5,
            title_size: 14.0,
            body_size: 12.0,
            footer_size: 12.0,
            letterhead_size: 8.0,
        }
    }
}

/// Raised when the artifact cannot be produced.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("document could not be finalized: {0}")]
    Finalize(String),
    #[error("rendered document was empty")]
    EmptyArtifact,
}

const LETTERHEAD_LINES: [&str; 3] = [
    "Faculdade Horizonte - Secretaria de Registros Acadêmicos",
    "Avenida das Acácias, 1200, Centro - Belo Horizonte/MG - CEP 30110-017",
    "secretaria@faculdadehorizonte.example.br - (31) 3555-0170",
];

const LETTERHEAD_LEADING: f32 = 3.5;

/// Renders declaration letters into paginated A4 PDF buffers: bold centered
/// title, justified body paragraphs, centered footer, and the institutional
/// letterhead pinned to the foot of every page.
#[derive(Debug, Clone, Default)]
pub struct LetterRenderer {
    layout: PageLayout,
}

impl LetterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: PageLayout) -> Self {
        Self { layout }
    }

    pub fn render(&self, letter: &Letter) -> Result<Vec<u8>, RenderError> {
        let layout = &self.layout;
        let (doc, first_page, first_layer) = PdfDocument::new(
            letter.title.clone(),
            Mm(layout.page_width),
            Mm(layout.page_height),
            "letter",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| RenderError::Finalize(err.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| RenderError::Finalize(err.to_string()))?;

        let content_width_mm = layout.page_width - layout.margin_left - layout.margin_right;
        let content_width_pt = mm_to_pt(content_width_mm);
        let indent_pt = mm_to_pt(layout.paragraph_indent);

        let mut layer = doc.get_page(first_page).get_layer(first_layer);
        draw_letterhead(&layer, layout, &regular);

        // Title block, bold and horizontally centered.
        let mut y = layout.page_height - layout.margin_top - layout.title_offset;
        for words in break_paragraph(
            &letter.title,
            LetterFont::HelveticaBold,
            layout.title_size,
            content_width_pt,
            content_width_pt,
        ) {
            let text = words.join(" ");
            let x = centered_x(&text, LetterFont::HelveticaBold, layout.title_size, layout);
            layer.use_text(text, layout.title_size, Mm(x), Mm(y), &bold);
            y -= layout.line_height;
        }
        y -= layout.line_height;

        // Body: one justified paragraph per newline-delimited line.
        for paragraph in letter.body.split('\n') {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                y -= layout.line_height;
                continue;
            }
            let lines = break_paragraph(
                paragraph,
                LetterFont::Helvetica,
                layout.body_size,
                content_width_pt - indent_pt,
                content_width_pt,
            );
            let count = lines.len();
            for (index, words) in lines.into_iter().enumerate() {
                if y < layout.margin_bottom + layout.line_height {
                    layer = start_page(&doc, layout, &regular);
                    y = layout.page_height - layout.margin_top;
                }
                let first = index == 0;
                let last = index + 1 == count;
                let x = if first {
                    layout.margin_left + layout.paragraph_indent
                } else {
                    layout.margin_left
                };
                let width_pt = if first {
                    content_width_pt - indent_pt
                } else {
                    content_width_pt
                };
                draw_body_line(&layer, &words, &regular, layout.body_size, x, y, width_pt, last);
                y -= layout.line_height;
            }
        }

        // Footer block, centered lines below the body.
        y -= layout.line_height;
        for line in letter.footer.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                y -= layout.line_height;
                continue;
            }
            if y < layout.margin_bottom + layout.line_height {
                layer = start_page(&doc, layout, &regular);
                y = layout.page_height - layout.margin_top;
            }
            let x = centered_x(line, LetterFont::Helvetica, layout.footer_size, layout);
            layer.use_text(line, layout.footer_size, Mm(x), Mm(y), &regular);
            y -= layout.line_height;
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|err| RenderError::Finalize(err.to_string()))?;
        if bytes.is_empty() {
            return Err(RenderError::EmptyArtifact);
        }
        Ok(bytes)
    }
}

fn centered_x(text: &str, font: LetterFont, size: f32, layout: &PageLayout) -> f32 {
    let content_width_mm = layout.page_width - layout.margin_left - layout.margin_right;
    let text_width_mm = pt_to_mm(font.text_width(text, size));
    layout.margin_left + ((content_width_mm - text_width_mm) / 2.0).max(0.0)
}

/// Open a fresh page with the letterhead already placed.
fn start_page(
    doc: &PdfDocumentReference,
    layout: &PageLayout,
    regular: &IndirectFontRef,
) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(layout.page_width), Mm(layout.page_height), "letter");
    let layer = doc.get_page(page).get_layer(layer);
    draw_letterhead(&layer, layout, regular);
    layer
}

/// Centered contact lines at reduced size, inside the reserved bottom band.
fn draw_letterhead(layer: &PdfLayerReference, layout: &PageLayout, regular: &IndirectFontRef) {
    let mut y = layout.margin_bottom - 10.0;
    for line in LETTERHEAD_LINES {
        let x = centered_x(line, LetterFont::Helvetica, layout.letterhead_size, layout);
        layer.use_text(line, layout.letterhead_size, Mm(x), Mm(y), regular);
        y -= LETTERHEAD_LEADING;
    }
}

/// Greedy line breaking against the measured advance widths.
fn break_paragraph(
    paragraph: &str,
    font: LetterFont,
    size: f32,
    first_width_pt: f32,
    rest_width_pt: f32,
) -> Vec<Vec<String>> {
    let space_pt = font.text_width(" ", size);
    let mut lines: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_width = 0.0_f32;
    let mut limit = first_width_pt;

    for word in paragraph.split_whitespace() {
        let word_width = font.text_width(word, size);
        let candidate = if current.is_empty() {
            word_width
        } else {
            current_width + space_pt + word_width
        };
        if !current.is_empty() && candidate > limit {
            lines.push(std::mem::take(&mut current));
            limit = rest_width_pt;
            current.push(word.to_string());
            current_width = word_width;
        } else {
            current.push(word.to_string());
            current_width = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Draw one body line, spreading leftover width across the word gaps unless
/// the line closes its paragraph.
#[allow(clippy::too_many_arguments)]
fn draw_body_line(
    layer: &PdfLayerReference,
    words: &[String],
    font_ref: &IndirectFontRef,
    size: f32,
    x_mm: f32,
    y_mm: f32,
    width_pt: f32,
    last: bool,
) {
    let text = words.join(" ");
    if last || words.len() < 2 {
        layer.use_text(text, size, Mm(x_mm), Mm(y_mm), font_ref);
        return;
    }
    let natural_pt = LetterFont::Helvetica.text_width(&text, size);
    let gaps = (words.len() - 1) as f32;
    let spacing = ((width_pt - natural_pt) / gaps).max(0.0);
    layer.set_word_spacing(spacing);
    layer.use_text(text, size, Mm(x_mm), Mm(y_mm), font_ref);
    layer.set_word_spacing(0.0);
}
