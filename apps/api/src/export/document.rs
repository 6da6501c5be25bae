//! Flattens a report view into a linear list of styled blocks, the input to
//! pagination.

use crate::export::font_metrics::FontWeight;
use crate::insights::Insight;
use crate::report::view::{fmt_rate, ReasonRow, ReportView, TrendView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Subheading,
    Body,
    Muted,
}

impl LineStyle {
    pub fn size_pt(self) -> f32 {
        match self {
            LineStyle::Title => 18.0,
            LineStyle::Heading => 13.0,
            LineStyle::Subheading => 10.5,
            LineStyle::Body => 10.0,
            LineStyle::Muted => 8.5,
        }
    }

    pub fn weight(self) -> FontWeight {
        match self {
            LineStyle::Title | LineStyle::Heading | LineStyle::Subheading => FontWeight::Bold,
            LineStyle::Body | LineStyle::Muted => FontWeight::Regular,
        }
    }

    /// Grey level, 0.0 black to 1.0 white.
    pub fn grey(self) -> f32 {
        match self {
            LineStyle::Muted => 0.45,
            _ => 0.1,
        }
    }

    pub fn space_before_mm(self) -> f32 {
        match self {
            LineStyle::Title => 0.0,
            LineStyle::Heading => 7.0,
            LineStyle::Subheading => 3.0,
            LineStyle::Body | LineStyle::Muted => 0.8,
        }
    }

    /// Headings must be followed by content on the same page.
    pub fn keep_with_next(self) -> bool {
        matches!(self, LineStyle::Heading | LineStyle::Subheading)
    }
}

/// One logical paragraph; pagination wraps it into rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub text: String,
    pub style: LineStyle,
    pub indent_mm: f32,
}

const INDENT_MM: f32 = 5.0;

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
}

impl Builder {
    fn push(&mut self, style: LineStyle, text: impl Into<String>) {
        self.blocks.push(Block {
            text: text.into(),
            style,
            indent_mm: 0.0,
        });
    }

    fn indented(&mut self, style: LineStyle, text: impl Into<String>) {
        self.blocks.push(Block {
            text: text.into(),
            style,
            indent_mm: INDENT_MM,
        });
    }

    fn reasons(&mut self, rows: &[ReasonRow], not_specified: u64) {
        for row in rows {
            self.indented(
                LineStyle::Body,
                format!("{}: {} ({}%)", row.reason, row.count, row.pct),
            );
        }
        if not_specified > 0 {
            self.indented(
                LineStyle::Muted,
                format!("{not_specified} with no reason specified"),
            );
        }
    }

    fn trend(&mut self, heading: &str, trend: &TrendView) {
        self.push(LineStyle::Subheading, heading);
        if let Some(message) = &trend.message {
            self.push(LineStyle::Muted, message);
            return;
        }
        for p in &trend.points {
            self.indented(
                LineStyle::Body,
                format!(
                    "{}: {} conversations, {} conversion, {} details, {} escalation, {} booked",
                    p.period,
                    p.total,
                    fmt_rate(p.conversion_rate),
                    fmt_rate(p.details_rate),
                    fmt_rate(p.escalation_rate),
                    p.booked
                ),
            );
        }
    }
}

/// Builds the printable document. `insights` replaces the rule-based
/// observations when present and non-empty.
pub fn build_document(view: &ReportView, insights: Option<&[Insight]>) -> Vec<Block> {
    let mut b = Builder::default();

    b.push(LineStyle::Title, &view.report_title);
    b.push(LineStyle::Muted, &view.period_label);
    let d = &view.dedup;
    b.push(
        LineStyle::Muted,
        format!(
            "{} raw records | {} in date range | {} unique candidates ({})",
            d.raw, d.filtered, d.unique, d.removed_label
        ),
    );

    b.push(LineStyle::Heading, "Key Metrics");
    for card in &view.scorecards {
        b.push(
            LineStyle::Body,
            format!("{}: {} ({})", card.label, card.value, card.subtitle),
        );
    }

    b.push(LineStyle::Heading, "Recruitment Funnel");
    for bar in &view.funnel.bars {
        b.push(
            LineStyle::Body,
            format!("{}: {} ({}% of total)", bar.name, bar.count, bar.pct_of_total),
        );
    }
    if !view.funnel.dropoffs.is_empty() {
        b.push(LineStyle::Subheading, "Drop-off Analysis");
        for row in &view.funnel.dropoffs {
            b.indented(
                LineStyle::Body,
                format!(
                    "{}: {} dropped ({}%)",
                    row.transition, row.dropped, row.dropoff_pct
                ),
            );
        }
    }

    b.push(LineStyle::Heading, "Candidate Breakdown");
    b.push(LineStyle::Muted, &view.breakdowns.subtitle);
    for pie in &view.breakdowns.pies {
        b.push(LineStyle::Subheading, format!("{} ({})", pie.title, pie.total));
        match &pie.empty_message {
            Some(message) => b.indented(LineStyle::Muted, message),
            None => {
                for slice in &pie.slices {
                    b.indented(
                        LineStyle::Body,
                        format!("{}: {} ({}%)", slice.name, slice.value, slice.pct),
                    );
                }
            }
        }
    }

    let esc = &view.escalation;
    b.push(LineStyle::Heading, "Human Escalation Analysis");
    b.push(
        LineStyle::Body,
        format!(
            "{} escalated ({}), AI autonomy {}",
            esc.total,
            fmt_rate(esc.rate),
            fmt_rate(esc.ai_autonomy)
        ),
    );
    match &esc.empty_message {
        Some(message) => b.push(LineStyle::Muted, message),
        None => b.reasons(&esc.reasons, esc.not_specified),
    }

    let kiv = &view.kiv;
    b.push(LineStyle::Heading, &kiv.title);
    b.push(LineStyle::Muted, &kiv.subtitle);
    b.push(
        LineStyle::Body,
        format!("{} total ({})", kiv.total, fmt_rate(kiv.rate)),
    );
    match &kiv.empty_message {
        Some(message) => b.push(LineStyle::Muted, message),
        None => b.reasons(&kiv.reasons, kiv.not_specified),
    }

    b.push(LineStyle::Heading, "Trends");
    b.trend("Weekly", &view.weekly_trend);
    b.trend("Monthly", &view.monthly_trend);

    let (heading, observations) = match insights.filter(|i| !i.is_empty()) {
        Some(ai) => ("AI Observations", ai),
        None => ("Key Observations", view.fallback_observations.as_slice()),
    };
    if !observations.is_empty() {
        b.push(LineStyle::Heading, heading);
        for insight in observations {
            b.push(
                LineStyle::Subheading,
                format!("[{}] {}", insight.display_kind(), insight.title),
            );
            b.push(LineStyle::Body, &insight.body);
        }
    }

    b.blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ClientRegistry;
    use crate::report::models::compute_dropoffs;
    use crate::report::view::build_report_view;
    use crate::report::{Kpis, Period, ReportAggregate};

    fn sample_view() -> ReportView {
        let mut report = ReportAggregate {
            period: Period {
                start: "2025-03-01".to_string(),
                end: "2025-03-31".to_string(),
            },
            kpis: Kpis {
                total_unique_conversations: 100,
                conversion_rate: 25.0,
                booked_appointment: 25,
                ..Default::default()
            },
            funnel: compute_dropoffs(&[("Started", 100), ("Details", 80), ("Booked", 50)]),
            ..Default::default()
        };
        report.escalation.total = 0;
        let registry = ClientRegistry::builtin();
        build_report_view(&report, registry.resolve("henderson"))
    }

    fn texts(blocks: &[Block], style: LineStyle) -> Vec<&str> {
        blocks
            .iter()
            .filter(|b| b.style == style)
            .map(|b| b.text.as_str())
            .collect()
    }

    #[test]
    fn test_document_starts_with_title_and_period() {
        let view = sample_view();
        let blocks = build_document(&view, None);
        assert_eq!(blocks[0].style, LineStyle::Title);
        assert_eq!(blocks[0].text, view.report_title);
        assert_eq!(blocks[1].text, view.period_label);
    }

    #[test]
    fn test_document_lists_funnel_and_dropoffs() {
        let blocks = build_document(&sample_view(), None);
        let body = texts(&blocks, LineStyle::Body);
        assert!(body.contains(&"Started: 100 (100.0% of total)"));
        assert!(body.iter().any(|t| t.ends_with("30 dropped (37.5%)")));
    }

    #[test]
    fn test_ai_insights_replace_fallback_observations() {
        let view = sample_view();
        let ai = vec![Insight::new("Strong bookings", "Keep going.", "positive")];

        let with_ai = build_document(&view, Some(&ai));
        let headings = texts(&with_ai, LineStyle::Heading);
        assert!(headings.contains(&"AI Observations"));
        assert!(texts(&with_ai, LineStyle::Subheading).contains(&"[positive] Strong bookings"));

        let without = build_document(&view, Some(&[]));
        assert!(texts(&without, LineStyle::Heading).contains(&"Key Observations"));
    }

    #[test]
    fn test_every_heading_is_followed_by_content() {
        let blocks = build_document(&sample_view(), None);
        for pair in blocks.windows(2) {
            if pair[0].style == LineStyle::Heading {
                assert_ne!(pair[1].style, LineStyle::Heading, "empty section {}", pair[0].text);
            }
        }
        assert!(!blocks.last().unwrap().style.keep_with_next());
    }
}
