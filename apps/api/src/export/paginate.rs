//! Page layout: wraps blocks into rows with the Helvetica metric tables and
//! distributes them over fixed-size pages.
//!
//! # Rules
//! - rows never cross the bottom margin (the footer band is reserved)
//! - a heading is never the last row on a page; it moves to the next page
//!   together with the first row of what follows it
//! - vertical gaps before a block are dropped at the top of a page

use crate::export::document::{Block, LineStyle};
use crate::export::font_metrics::get_metrics;

const PT_TO_MM: f32 = 25.4 / 72.0;
const LINE_SPACING: f32 = 1.35;

#[derive(Debug, Clone, Copy)]
pub struct PageConfig {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    /// Space kept free above the bottom margin for the footer.
    pub footer_band_mm: f32,
}

pub const A4: PageConfig = PageConfig {
    width_mm: 210.0,
    height_mm: 297.0,
    margin_mm: 18.0,
    footer_band_mm: 10.0,
};

impl PageConfig {
    pub fn text_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn usable_height_mm(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm - self.footer_band_mm
    }
}

pub fn line_height_mm(style: LineStyle) -> f32 {
    style.size_pt() * PT_TO_MM * LINE_SPACING
}

/// One printed row, positioned from the page's bottom-left corner (PDF
/// coordinates).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: LineStyle,
    pub x_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
    pub used_height_mm: f32,
}

impl Page {
    pub fn fill_fraction(&self, config: &PageConfig) -> f32 {
        self.used_height_mm / config.usable_height_mm()
    }
}

/// A block after wrapping.
struct Wrapped<'a> {
    block: &'a Block,
    rows: Vec<String>,
}

impl Wrapped<'_> {
    fn row_height(&self) -> f32 {
        line_height_mm(self.block.style)
    }
}

fn wrap_block(block: &Block, config: &PageConfig) -> Vec<String> {
    let metrics = get_metrics(block.style.weight());
    let width_mm = config.text_width_mm() - block.indent_mm;
    let em_mm = block.style.size_pt() * PT_TO_MM;
    metrics.wrap(&block.text, width_mm / em_mm)
}

struct Cursor<'c> {
    config: &'c PageConfig,
    pages: Vec<Page>,
    current: Page,
}

impl<'c> Cursor<'c> {
    fn new(config: &'c PageConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            current: Page::default(),
        }
    }

    fn at_top(&self) -> bool {
        self.current.lines.is_empty()
    }

    fn gap(&self, style: LineStyle) -> f32 {
        if self.at_top() {
            0.0
        } else {
            style.space_before_mm()
        }
    }

    fn remaining(&self) -> f32 {
        self.config.usable_height_mm() - self.current.used_height_mm
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
    }

    fn place(&mut self, text: &str, block: &Block, gap: f32) {
        let height = line_height_mm(block.style);
        self.current.used_height_mm += gap + height;
        // Baseline sits a quarter of the row height above the row's bottom.
        let y = self.config.height_mm
            - self.config.margin_mm
            - self.current.used_height_mm
            + height * 0.25;
        self.current.lines.push(PlacedLine {
            text: text.to_string(),
            style: block.style,
            x_mm: self.config.margin_mm + block.indent_mm,
            y_mm: y,
        });
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.at_top() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

/// Height needed to start `wrapped[i]` (a heading) here: every row of each
/// heading in the chain plus the first row of the block that ends it.
fn keep_chain_height(wrapped: &[Wrapped<'_>], i: usize, first_gap: f32) -> f32 {
    let mut needed = first_gap;
    let mut j = i;
    loop {
        let w = &wrapped[j];
        if j > i {
            needed += w.block.style.space_before_mm();
        }
        if !w.block.style.keep_with_next() {
            return needed + w.row_height();
        }
        needed += w.row_height() * w.rows.len() as f32;
        if j + 1 == wrapped.len() {
            return needed;
        }
        j += 1;
    }
}

pub fn paginate(blocks: &[Block], config: &PageConfig) -> Vec<Page> {
    let wrapped: Vec<Wrapped<'_>> = blocks
        .iter()
        .map(|block| Wrapped {
            block,
            rows: wrap_block(block, config),
        })
        .filter(|w| !w.rows.is_empty())
        .collect();

    let mut cursor = Cursor::new(config);

    for (i, w) in wrapped.iter().enumerate() {
        let style = w.block.style;

        if style.keep_with_next() {
            let needed = keep_chain_height(&wrapped, i, cursor.gap(style));
            if needed > cursor.remaining() && !cursor.at_top() {
                cursor.new_page();
            }
        }

        for (r, row) in w.rows.iter().enumerate() {
            let gap = if r == 0 { cursor.gap(style) } else { 0.0 };
            if gap + w.row_height() > cursor.remaining() && !cursor.at_top() {
                cursor.new_page();
            }
            let gap = if r == 0 { cursor.gap(style) } else { 0.0 };
            cursor.place(row, w.block, gap);
        }
    }

    cursor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(style: LineStyle, text: &str) -> Block {
        Block {
            text: text.to_string(),
            style,
            indent_mm: 0.0,
        }
    }

    fn body_lines(n: usize) -> Vec<Block> {
        (0..n)
            .map(|i| block(LineStyle::Body, &format!("Line {i}")))
            .collect()
    }

    #[test]
    fn test_empty_document_has_one_blank_page() {
        let pages = paginate(&[], &A4);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }

    #[test]
    fn test_rows_stay_inside_margins() {
        let pages = paginate(&body_lines(200), &A4);
        assert!(pages.len() > 1);
        let floor = A4.margin_mm + A4.footer_band_mm;
        for page in &pages {
            assert!(page.fill_fraction(&A4) <= 1.0 + 1e-4);
            for line in &page.lines {
                assert!(line.y_mm >= floor, "{} at {}", line.text, line.y_mm);
                assert!(line.y_mm <= A4.height_mm - A4.margin_mm);
            }
        }
        let total: usize = pages.iter().map(|p| p.lines.len()).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn test_rows_keep_document_order() {
        let pages = paginate(&body_lines(120), &A4);
        let texts: Vec<String> = pages
            .iter()
            .flat_map(|p| p.lines.iter().map(|l| l.text.clone()))
            .collect();
        let expected: Vec<String> = (0..120).map(|i| format!("Line {i}")).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_heading_never_ends_a_page() {
        // Try every offset so the heading lands near the bottom at least once.
        for filler in 40..90 {
            let mut blocks = body_lines(filler);
            blocks.push(block(LineStyle::Heading, "Recruitment Funnel"));
            blocks.push(block(LineStyle::Subheading, "Drop-off Analysis"));
            blocks.extend(body_lines(5));

            for page in paginate(&blocks, &A4) {
                let last = page.lines.last().unwrap();
                assert!(
                    !last.style.keep_with_next(),
                    "filler {filler}: page ends with '{}'",
                    last.text
                );
            }
        }
    }

    #[test]
    fn test_long_paragraph_wraps_within_text_width() {
        let long = "word ".repeat(200);
        let pages = paginate(&[block(LineStyle::Body, &long)], &A4);
        let rows: Vec<&PlacedLine> = pages.iter().flat_map(|p| &p.lines).collect();
        assert!(rows.len() > 5);
        let metrics = get_metrics(LineStyle::Body.weight());
        let em_mm = LineStyle::Body.size_pt() * PT_TO_MM;
        for row in rows {
            assert!(metrics.measure_str(&row.text) * em_mm <= A4.text_width_mm() + 1e-3);
        }
    }

    #[test]
    fn test_indent_shifts_x() {
        let mut b = block(LineStyle::Body, "indented");
        b.indent_mm = 5.0;
        let pages = paginate(&[b], &A4);
        assert_eq!(pages[0].lines[0].x_mm, A4.margin_mm + 5.0);
    }
}
