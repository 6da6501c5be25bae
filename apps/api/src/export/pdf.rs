//! Renders paginated lines with printpdf's built-in Helvetica faces.

use printpdf::{BuiltinFont, Color, Greyscale, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::export::document::LineStyle;
use crate::export::font_metrics::{get_metrics, FontWeight};
use crate::export::paginate::{Page, PageConfig};
use crate::export::ExportError;

const LAYER: &str = "Layer 1";
const FOOTER_SIZE_PT: f32 = 7.5;
const FOOTER_GREY: f32 = 0.5;
const PT_TO_MM: f32 = 25.4 / 72.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn for_weight(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Built-in fonts only carry the WinAnsi range; typographic punctuation is
/// folded to ASCII and anything else becomes `?`.
pub fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '–' | '—' | '−' => '-',
            '→' => '>',
            '‘' | '’' => '\'',
            '“' | '”' => '"',
            '•' | '·' => '*',
            '×' => 'x',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}

fn write_line(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    text: &str,
    style: LineStyle,
    x_mm: f32,
    y_mm: f32,
) {
    layer.set_fill_color(Color::Greyscale(Greyscale::new(style.grey(), None)));
    layer.use_text(
        pdf_safe(text),
        style.size_pt(),
        Mm(x_mm),
        Mm(y_mm),
        fonts.for_weight(style.weight()),
    );
}

fn write_footer(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    config: &PageConfig,
    footer: &str,
    page_no: usize,
    page_count: usize,
) {
    let y = config.margin_mm;
    layer.set_fill_color(Color::Greyscale(Greyscale::new(FOOTER_GREY, None)));
    layer.use_text(
        pdf_safe(footer),
        FOOTER_SIZE_PT,
        Mm(config.margin_mm),
        Mm(y),
        &fonts.regular,
    );

    let label = format!("Page {page_no} of {page_count}");
    let width_mm =
        get_metrics(FontWeight::Regular).measure_str(&label) * FOOTER_SIZE_PT * PT_TO_MM;
    layer.use_text(
        label,
        FOOTER_SIZE_PT,
        Mm(config.width_mm - config.margin_mm - width_mm),
        Mm(y),
        &fonts.regular,
    );
}

pub fn render_pages(
    title: &str,
    pages: &[Page],
    config: &PageConfig,
    footer: &str,
) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        pdf_safe(title),
        Mm(config.width_mm),
        Mm(config.height_mm),
        LAYER,
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(e.to_string()))?,
    };

    let page_count = pages.len();
    for (i, page) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(config.width_mm), Mm(config.height_mm), LAYER);
            doc.get_page(p).get_layer(l)
        };

        for line in &page.lines {
            write_line(&layer, &fonts, &line.text, line.style, line.x_mm, line.y_mm);
        }
        write_footer(&layer, &fonts, config, footer, i + 1, page_count);
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_safe_folds_punctuation() {
        assert_eq!(pdf_safe("1 Mar 2025 – 31 Mar 2025"), "1 Mar 2025 - 31 Mar 2025");
        assert_eq!(pdf_safe("Started → Booked"), "Started > Booked");
        assert_eq!(pdf_safe("café"), "caf?");
    }
}
