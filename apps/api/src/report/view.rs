//! Presentation model for a Report Aggregate.
//!
//! Everything the dashboard draws is decided here: scorecard labels, chart
//! series, drop-off severities, sorted reason lists and the fallback
//! observations shown when AI insights are unavailable. The front-end binds
//! these structures to its charting library without further arithmetic, and
//! the PDF export renders from the same structures.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::clients::ClientProfile;
use crate::insights::Insight;
use crate::report::models::{round1, FunnelStage, ReasonSection, ReportAggregate, TrendPoint};

const FUNNEL_COLORS: [&str; 5] = ["#3b82f6", "#60a5fa", "#10b981", "#f59e0b", "#8b5cf6"];
const BREAKDOWN_COLORS: [&str; 10] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4", "#ec4899", "#84cc16",
    "#f97316", "#6366f1",
];
const NOT_SPECIFIED: &str = "Not specified";
pub const EMPTY_REPORT_MESSAGE: &str =
    "No records found in the selected date range. Try adjusting the start and end dates.";

// ────────────────────────────────────────────────────────────────────────────
// View types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub client_id: String,
    pub report_title: String,
    pub period_label: String,
    pub dedup: DedupView,
    pub scorecards: Vec<Scorecard>,
    pub funnel: FunnelView,
    pub breakdowns: BreakdownView,
    pub escalation: EscalationView,
    pub kiv: KivView,
    pub weekly_trend: TrendView,
    pub monthly_trend: TrendView,
    pub fallback_observations: Vec<Insight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupView {
    pub raw: u64,
    pub filtered: u64,
    pub unique: u64,
    pub removed_label: String,
    pub consistent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Blue,
    Green,
    Amber,
    Red,
    Purple,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scorecard {
    pub label: String,
    pub value: String,
    pub subtitle: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

impl Severity {
    /// > 50 % is danger, > 30 % is warning.
    pub fn for_dropoff(pct: f64) -> Self {
        if pct > 50.0 {
            Severity::Danger
        } else if pct > 30.0 {
            Severity::Warning
        } else {
            Severity::Success
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelBar {
    pub name: String,
    pub count: u64,
    /// Share of total conversations, one decimal.
    pub pct_of_total: String,
    pub dropoff: f64,
    pub fill: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DropoffRow {
    pub transition: String,
    pub dropped: u64,
    pub dropoff_pct: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelView {
    pub bars: Vec<FunnelBar>,
    pub dropoffs: Vec<DropoffRow>,
    pub non_increasing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: u64,
    pub pct: String,
    pub fill: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownPie {
    pub title: String,
    pub total: u64,
    pub slices: Vec<Slice>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownView {
    pub subtitle: String,
    pub pies: Vec<BreakdownPie>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonRow {
    pub reason: String,
    pub count: u64,
    pub pct: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EscalationView {
    pub total: u64,
    pub rate: f64,
    pub ai_autonomy: f64,
    pub reasons: Vec<ReasonRow>,
    pub not_specified: u64,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KivView {
    pub title: String,
    pub subtitle: String,
    pub total: u64,
    pub rate: f64,
    pub reasons: Vec<ReasonRow>,
    pub not_specified: u64,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMode {
    Week,
    Month,
}

impl TrendMode {
    fn noun(self) -> &'static str {
        match self {
            TrendMode::Week => "week",
            TrendMode::Month => "month",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendView {
    pub mode: TrendMode,
    pub title: String,
    pub points: Vec<TrendPoint>,
    /// Set instead of a chart when fewer than two periods are available.
    pub message: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Builders
// ────────────────────────────────────────────────────────────────────────────

pub fn build_report_view(report: &ReportAggregate, client: &ClientProfile) -> ReportView {
    let total = report.kpis.total_unique_conversations;
    ReportView {
        client_id: client.id.clone(),
        report_title: client.report_title.clone(),
        period_label: format_period(&report.period.start, &report.period.end),
        dedup: build_dedup_view(report),
        scorecards: build_scorecards(report, client),
        funnel: build_funnel_view(&report.funnel, total),
        breakdowns: build_breakdown_view(report, client),
        escalation: build_escalation_view(&report.escalation),
        kiv: build_kiv_view(&report.kiv, client),
        weekly_trend: build_trend_view(TrendMode::Week, &report.trends),
        monthly_trend: build_trend_view(
            TrendMode::Month,
            report
                .monthly_trends
                .as_deref()
                .unwrap_or(report.trends.as_slice()),
        ),
        fallback_observations: fallback_observations(report),
    }
}

/// `"1 Mar 2025 – 31 Mar 2025"`; falls back to the raw strings when either
/// date does not parse.
pub fn format_period(start: &str, end: &str) -> String {
    match (parse_iso_date(start), parse_iso_date(end)) {
        (Some(s), Some(e)) => format!("{} – {}", format_day(s), format_day(e)),
        _ => format!("{start} – {end}"),
    }
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    // Tolerate full timestamps; only the date part matters.
    let date = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn format_day(d: NaiveDate) -> String {
    d.format("%-d %b %Y").to_string()
}

/// First and last day of the month containing `today`.
pub fn default_date_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let next_month = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    let end = next_month.and_then(|d| d.pred_opt()).unwrap_or(start);
    (start, end)
}

fn build_dedup_view(report: &ReportAggregate) -> DedupView {
    let d = report.dedup_summary;
    DedupView {
        raw: d.raw,
        filtered: d.filtered,
        unique: d.unique,
        removed_label: format!(
            "{} duplicate{} removed",
            d.removed,
            if d.removed != 1 { "s" } else { "" }
        ),
        consistent: d.is_consistent(),
    }
}

/// Prints a rate the way the dashboard does: `25` not `25.0`.
pub fn fmt_rate(rate: f64) -> String {
    format!("{rate}%")
}

fn build_scorecards(report: &ReportAggregate, client: &ClientProfile) -> Vec<Scorecard> {
    let k = &report.kpis;
    let labels = &client.kpi_labels;
    vec![
        Scorecard {
            label: "Total Unique".to_string(),
            value: k.total_unique_conversations.to_string(),
            subtitle: "conversations".to_string(),
            tone: Tone::Blue,
        },
        Scorecard {
            label: "Details Rate".to_string(),
            value: fmt_rate(k.details_completion_rate),
            subtitle: format!("{} completed", k.details_completed),
            tone: Tone::Green,
        },
        Scorecard {
            label: labels.site_recommendation.label.clone(),
            value: fmt_rate(k.site_recommendation_rate),
            subtitle: labels.site_recommendation.subtitle(k.site_recommended),
            tone: Tone::Purple,
        },
        Scorecard {
            label: "Conversion".to_string(),
            value: fmt_rate(k.conversion_rate),
            subtitle: format!("{} booked", k.booked_appointment),
            tone: Tone::Green,
        },
        Scorecard {
            label: "Escalation".to_string(),
            value: fmt_rate(k.human_escalation_rate),
            subtitle: format!("{} escalated", k.escalated),
            tone: Tone::Red,
        },
        Scorecard {
            label: labels.kiv.label.clone(),
            value: fmt_rate(k.kiv_rate),
            subtitle: labels.kiv.subtitle(k.kiv),
            tone: Tone::Amber,
        },
    ]
}

fn pct_string(part: u64, total: u64) -> String {
    if total > 0 {
        format!("{:.1}", part as f64 / total as f64 * 100.0)
    } else {
        "0".to_string()
    }
}

pub fn build_funnel_view(stages: &[FunnelStage], total: u64) -> FunnelView {
    let bars = stages
        .iter()
        .enumerate()
        .map(|(i, s)| FunnelBar {
            name: s.stage.clone(),
            count: s.count,
            pct_of_total: pct_string(s.count, total),
            dropoff: s.dropoff_pct,
            fill: FUNNEL_COLORS[i % FUNNEL_COLORS.len()],
        })
        .collect();

    let dropoffs = stages
        .windows(2)
        .map(|w| DropoffRow {
            transition: format!("{} → {}", w[0].stage, w[1].stage),
            dropped: w[1].dropoff_from_previous,
            dropoff_pct: w[1].dropoff_pct,
            severity: Severity::for_dropoff(w[1].dropoff_pct),
        })
        .collect();

    FunnelView {
        bars,
        dropoffs,
        non_increasing: crate::report::models::is_non_increasing(stages),
    }
}

fn build_breakdown_view(report: &ReportAggregate, client: &ClientProfile) -> BreakdownView {
    let b = &report.breakdowns;
    let [t0, t1, t2] = &client.breakdown_titles;
    BreakdownView {
        subtitle: client.breakdown_subtitle.clone(),
        pies: vec![
            build_pie(t0, &b.area),
            build_pie(t1, &b.shift),
            build_pie(t2, &b.perm_relief),
        ],
    }
}

pub fn build_pie(title: &str, data: &BTreeMap<String, u64>) -> BreakdownPie {
    let entries = sorted_entries(data, |k| !k.trim().is_empty());
    let total: u64 = entries.iter().map(|(_, v)| v).sum();
    let slices: Vec<Slice> = entries
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| Slice {
            name: name.to_string(),
            value,
            pct: pct_string(value, total),
            fill: BREAKDOWN_COLORS[i % BREAKDOWN_COLORS.len()],
        })
        .collect();

    BreakdownPie {
        title: title.to_string(),
        total,
        empty_message: slices.is_empty().then(|| "No data available".to_string()),
        slices,
    }
}

/// Entries passing `keep`, sorted by count descending. Ties keep the map's
/// alphabetical order.
fn sorted_entries<'a>(
    data: &'a BTreeMap<String, u64>,
    keep: impl Fn(&str) -> bool,
) -> Vec<(&'a str, u64)> {
    let mut entries: Vec<(&str, u64)> = data
        .iter()
        .filter(|(k, _)| keep(k))
        .map(|(k, v)| (k.as_str(), *v))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// Named reasons (blank and "Not specified" excluded), most frequent first.
pub fn ranked_reasons(section: &ReasonSection) -> Vec<ReasonRow> {
    sorted_entries(&section.reasons, |k| {
        !k.trim().is_empty() && k != NOT_SPECIFIED
    })
    .into_iter()
    .map(|(reason, count)| ReasonRow {
        reason: reason.to_string(),
        count,
        pct: pct_string(count, section.total),
    })
    .collect()
}

fn not_specified(section: &ReasonSection) -> u64 {
    section.reasons.get(NOT_SPECIFIED).copied().unwrap_or(0)
}

pub fn build_escalation_view(section: &ReasonSection) -> EscalationView {
    EscalationView {
        total: section.total,
        rate: section.rate,
        ai_autonomy: round1(100.0 - section.rate),
        reasons: ranked_reasons(section),
        not_specified: not_specified(section),
        empty_message: (section.total == 0)
            .then(|| "No human escalations in this period — 100% AI autonomous.".to_string()),
    }
}

fn build_kiv_view(section: &ReasonSection, client: &ClientProfile) -> KivView {
    KivView {
        title: client.kiv_section.title.clone(),
        subtitle: client.kiv_section.subtitle.clone(),
        total: section.total,
        rate: section.rate,
        reasons: ranked_reasons(section),
        not_specified: not_specified(section),
        empty_message: (section.total == 0).then(|| client.kiv_section.empty_message.clone()),
    }
}

pub fn build_trend_view(mode: TrendMode, points: &[TrendPoint]) -> TrendView {
    let noun = mode.noun();
    let message = match points.len() {
        0 => Some(format!(
            "No {noun}ly data available. Ensure your uploads cover at least 2 {noun}s."
        )),
        1 => Some(format!(
            "Only 1 {noun} of data found. Upload files spanning multiple {noun}s to see trends."
        )),
        _ => None,
    };
    TrendView {
        mode,
        title: match mode {
            TrendMode::Week => "Weekly".to_string(),
            TrendMode::Month => "Monthly".to_string(),
        },
        points: if message.is_none() { points.to_vec() } else { Vec::new() },
        message,
    }
}

/// Rule-based observations shown in place of AI insights.
pub fn fallback_observations(report: &ReportAggregate) -> Vec<Insight> {
    let k = &report.kpis;
    let mut out = Vec::new();

    if k.conversion_rate > 0.0 {
        let verdict = if k.conversion_rate >= 20.0 {
            " This is a strong conversion rate."
        } else {
            " There may be opportunity to improve the booking flow."
        };
        out.push(Insight::new(
            format!("Conversion Rate at {}%", k.conversion_rate),
            format!(
                "{} out of {} unique candidates booked an appointment.{verdict}",
                k.booked_appointment, k.total_unique_conversations
            ),
            "insight",
        ));
    }

    if k.ai_autonomy_rate > 0.0 {
        out.push(Insight::new(
            format!("AI Autonomy at {}%", k.ai_autonomy_rate),
            format!(
                "The chatbot handled {} conversations without human intervention.",
                k.total_unique_conversations.saturating_sub(k.escalated)
            ),
            "positive",
        ));
    }

    if let Some(body) = biggest_dropoff(&report.funnel) {
        out.push(Insight::new("Biggest funnel drop-off", body, "warning"));
    }

    out
}

fn biggest_dropoff(funnel: &[FunnelStage]) -> Option<String> {
    let rest = funnel.get(1..).filter(|r| !r.is_empty())?;
    // Earliest stage wins ties.
    let worst = rest.iter().fold(&rest[0], |max, s| {
        if s.dropoff_pct > max.dropoff_pct {
            s
        } else {
            max
        }
    });
    let previous = funnel
        .iter()
        .find(|s| s.stage_num + 1 == worst.stage_num)
        .map(|s| s.stage.as_str())
        .unwrap_or("");
    Some(format!(
        "{}% drop from \"{}\" to \"{}\" ({} candidates lost).",
        worst.dropoff_pct, previous, worst.stage, worst.dropoff_from_previous
    ))
}
