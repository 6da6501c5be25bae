//! Investor success story: a structured ROI narrative written by the LLM from
//! the report aggregate, with optional manual-recruitment benchmarks.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clients::{Benchmarks, ClientProfile};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, funnel_lines, instructions_block, kpi_lines};
use crate::llm_client::{extract_json_object, TextGenerator, STORY_MODEL};
use crate::report::{DedupSummary, FunnelStage, Kpis, Period, ReasonSection, TrendPoint};
use crate::story::prompts::*;

/// Fewer trend points than this and the story carries no trend summary.
const MIN_TREND_POINTS: usize = 2;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SuccessStory {
    pub headline: String,
    pub hero_metrics: Vec<HeroMetric>,
    pub roi_section: Option<RoiSection>,
    pub throughput_section: StorySection,
    pub conversion_section: StorySection,
    pub autonomy_section: StorySection,
    pub trend_summary: Option<String>,
    pub closing_statement: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeroMetric {
    pub value: String,
    pub label: String,
    pub context: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoiSection {
    pub title: String,
    pub narrative: String,
    pub savings: Vec<Saving>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Saving {
    pub metric: String,
    pub value: String,
    pub calculation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorySection {
    pub title: String,
    pub narrative: String,
}

impl StorySection {
    fn push_lines(&self, lines: &mut Vec<String>) {
        lines.push(self.title.to_uppercase());
        lines.push(self.narrative.clone());
    }
}

impl SuccessStory {
    /// Copy-paste text layout: headline, KEY METRICS, optional ROI, the three
    /// sections, optional TRENDS, closing statement.
    pub fn to_plain_text(&self) -> String {
        let mut lines = vec![
            self.headline.clone(),
            String::new(),
            "KEY METRICS".to_string(),
        ];
        lines.extend(
            self.hero_metrics
                .iter()
                .map(|m| format!("  {}: {} — {}", m.label, m.value, m.context)),
        );
        lines.push(String::new());

        if let Some(roi) = &self.roi_section {
            lines.push(roi.title.to_uppercase());
            lines.push(roi.narrative.clone());
            lines.push(String::new());
            lines.extend(
                roi.savings
                    .iter()
                    .map(|s| format!("  {}: {} ({})", s.metric, s.value, s.calculation)),
            );
            lines.push(String::new());
        }

        self.throughput_section.push_lines(&mut lines);
        lines.push(String::new());
        self.conversion_section.push_lines(&mut lines);
        lines.push(String::new());
        self.autonomy_section.push_lines(&mut lines);

        if let Some(summary) = &self.trend_summary {
            lines.push(String::new());
            lines.push("TRENDS".to_string());
            lines.push(summary.clone());
        }

        lines.push(String::new());
        lines.push(self.closing_statement.clone());
        lines.join("\n")
    }
}

/// Benchmarks as the dashboard form sends them: a cleared input arrives as
/// `null`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BenchmarkInputs {
    pub cost_per_recruiter_hour: Option<f64>,
    pub manual_screening_minutes: Option<f64>,
    pub recruiter_hours_per_day: Option<f64>,
    pub monthly_recruiter_salary: Option<f64>,
}

impl BenchmarkInputs {
    /// All four values, or `None` when any is missing. ROI needs the full set.
    pub fn complete(&self) -> Option<Benchmarks> {
        Some(Benchmarks {
            cost_per_recruiter_hour: self.cost_per_recruiter_hour?,
            manual_screening_minutes: self.manual_screening_minutes?,
            recruiter_hours_per_day: self.recruiter_hours_per_day?,
            monthly_recruiter_salary: self.monthly_recruiter_salary?,
        })
    }
}

impl From<Benchmarks> for BenchmarkInputs {
    fn from(b: Benchmarks) -> Self {
        Self {
            cost_per_recruiter_hour: Some(b.cost_per_recruiter_hour),
            manual_screening_minutes: Some(b.manual_screening_minutes),
            recruiter_hours_per_day: Some(b.recruiter_hours_per_day),
            monthly_recruiter_salary: Some(b.monthly_recruiter_salary),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryRequest {
    pub client_id: String,
    pub custom_instructions: Option<String>,
    pub benchmarks: Option<BenchmarkInputs>,
    pub kpis: Kpis,
    pub funnel: Vec<FunnelStage>,
    pub trends: Option<Vec<TrendPoint>>,
    pub escalation: ReasonSection,
    pub kiv: ReasonSection,
    pub dedup_summary: DedupSummary,
    pub period: Period,
}

impl StoryRequest {
    fn trends(&self) -> &[TrendPoint] {
        self.trends.as_deref().unwrap_or_default()
    }

    /// A partly filled benchmark set counts as no benchmarks.
    pub fn benchmarks(&self) -> Option<Benchmarks> {
        self.benchmarks.as_ref().and_then(BenchmarkInputs::complete)
    }
}

fn trend_lines(trends: &[TrendPoint]) -> String {
    if trends.is_empty() {
        return NO_TREND_DATA.to_string();
    }
    trends
        .iter()
        .map(|t| {
            format!(
                "- {}: {} conversations, {}% conversion, {} booked",
                t.period, t.total, t.conversion_rate, t.booked
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn benchmark_block(benchmarks: Option<Benchmarks>) -> String {
    let Some(b) = benchmarks else {
        return String::new();
    };
    fill_template(
        BENCHMARK_BLOCK_TEMPLATE,
        &[
            ("cost_per_hour", b.cost_per_recruiter_hour.to_string()),
            ("screening_minutes", b.manual_screening_minutes.to_string()),
            ("hours_per_day", b.recruiter_hours_per_day.to_string()),
            ("monthly_salary", b.monthly_recruiter_salary.to_string()),
        ],
    )
}

fn pick(cond: bool, yes: &str, no: &str) -> String {
    let chosen = if cond { yes } else { no };
    chosen.to_string()
}

pub fn build_story_prompt(client: &ClientProfile, request: &StoryRequest) -> String {
    let names = &client.insights.kpi_names;
    let benchmarks = request.benchmarks();
    let has_benchmarks = benchmarks.is_some();
    let has_trend = request.trends().len() >= MIN_TREND_POINTS;

    fill_template(
        STORY_PROMPT_TEMPLATE,
        &[
            ("company_context", client.success_story.company_context.clone()),
            ("role_description", client.success_story.role_description.clone()),
            ("period_start", request.period.start.clone()),
            ("period_end", request.period.end.clone()),
            ("dedup_unique", request.dedup_summary.unique.to_string()),
            ("dedup_raw", request.dedup_summary.raw.to_string()),
            ("kpi_lines", kpi_lines(&request.kpis, names)),
            ("funnel_lines", funnel_lines(&request.funnel)),
            ("trend_lines", trend_lines(request.trends())),
            ("escalation_total", request.escalation.total.to_string()),
            ("escalation_rate", request.escalation.rate.to_string()),
            ("kiv_name", names.kiv.clone()),
            ("kiv_total", request.kiv.total.to_string()),
            ("kiv_rate", request.kiv.rate.to_string()),
            ("roi_shape", pick(has_benchmarks, ROI_SHAPE, "null")),
            ("trend_shape", pick(has_trend, TREND_SHAPE, "null")),
            (
                "roi_guideline",
                pick(has_benchmarks, ROI_GUIDELINE, NO_ROI_GUIDELINE),
            ),
            (
                "trend_guideline",
                pick(has_trend, TREND_GUIDELINE, NO_TREND_GUIDELINE),
            ),
            ("benchmark_block", benchmark_block(benchmarks)),
            (
                "instructions_block",
                instructions_block(request.custom_instructions.as_deref()),
            ),
        ],
    )
}

/// Calls the LLM and parses the story. A reply without a parsable JSON object
/// yields `None`.
pub async fn generate_story(
    llm: &dyn TextGenerator,
    client: &ClientProfile,
    request: &StoryRequest,
) -> Result<Option<SuccessStory>, AppError> {
    let prompt = build_story_prompt(client, request);
    info!(
        "Generating success story for client '{}' (benchmarks: {})",
        client.id,
        request.benchmarks().is_some()
    );

    let text = llm.complete(&prompt, STORY_MODEL).await?;
    let story = extract_json_object::<SuccessStory>(&text);
    if story.is_none() {
        warn!("Success story response contained no JSON object");
    }
    Ok(story)
}
