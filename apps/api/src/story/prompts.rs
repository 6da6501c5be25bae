/// Success story prompt template.
/// Placeholders: {company_context}, {role_description}, {period_start}, {period_end},
///          {dedup_unique}, {dedup_raw}, {kpi_lines}, {funnel_lines}, {trend_lines},
///          {escalation_total}, {escalation_rate}, {kiv_name}, {kiv_total}, {kiv_rate},
///          {benchmark_block}, {roi_shape}, {trend_shape}, {roi_guideline},
///          {trend_guideline}, {instructions_block}. Filled in one pass by
///          `fill_template`.
pub const STORY_PROMPT_TEMPLATE: &str = r#"You are an investor relations writer creating a compelling ROI success story for {company_context}'s AI-powered recruitment chatbot (PilotPulse) that recruits {role_description}.{instructions_block}

**Reporting Period:** {period_start} to {period_end}
**Data Summary:** {dedup_unique} unique candidates from {dedup_raw} total records

**KPIs:**
{kpi_lines}

**Funnel:**
{funnel_lines}

**Trends:**
{trend_lines}

**Escalation:** {escalation_total} total ({escalation_rate}%)
**{kiv_name}:** {kiv_total} total ({kiv_rate}%)
{benchmark_block}
Generate a structured success story as a JSON object with this exact shape:
{
  "headline": "Punchy, numbers-driven headline (max 15 words)",
  "heroMetrics": [
    { "value": "85%", "label": "AI Autonomy Rate", "context": "Brief context sentence" }
  ],
  "roiSection": {roi_shape},
  "throughputSection": {
    "title": "Throughput & Availability",
    "narrative": "2-3 sentences about volume handled, 24/7 availability, no capacity limits"
  },
  "conversionSection": {
    "title": "Conversion Efficiency",
    "narrative": "2-3 sentences about funnel efficiency and booking rate"
  },
  "autonomySection": {
    "title": "AI Autonomy",
    "narrative": "2-3 sentences about % handled without humans and cost implications"
  },
  "trendSummary": {trend_shape},
  "closingStatement": "Forward-looking, confident closing sentence"
}

Guidelines:
- heroMetrics: exactly 3-4 of the most impressive numbers with brief context
- Use specific numbers throughout. Professional, data-driven, confident but not hyperbolic
- {roi_guideline}
- {trend_guideline}
- Suitable for investor presentations and pitch decks

Return ONLY the JSON object, no markdown fences or other text."#;

pub const NO_TREND_DATA: &str = "No trend data available.";

pub const ROI_SHAPE: &str = r#"{
    "title": "Return on Investment",
    "narrative": "2-3 sentences about cost savings with specific calculated numbers",
    "savings": [
      { "metric": "Hours Saved", "value": "125 hours", "calculation": "How you calculated this" }
    ]
  }"#;

pub const TREND_SHAPE: &str = r#""1-2 sentences about improvement trajectory over time""#;

pub const ROI_GUIDELINE: &str =
    "roiSection: show specific ROI calculations using the benchmarks provided";
pub const NO_ROI_GUIDELINE: &str = "roiSection must be null since no benchmarks were provided";
pub const TREND_GUIDELINE: &str = "trendSummary: mention improvement trajectory";
pub const NO_TREND_GUIDELINE: &str =
    "trendSummary must be null since insufficient trend data";

/// Benchmark block. Placeholders: {cost_per_hour}, {screening_minutes},
/// {hours_per_day}, {monthly_salary}.
pub const BENCHMARK_BLOCK_TEMPLATE: &str = r#"
**Manual Recruitment Benchmarks (for ROI calculation):**
- Cost per recruiter hour: SGD {cost_per_hour}
- Time to manually screen one candidate: {screening_minutes} minutes
- Working hours per recruiter per day: {hours_per_day}
- Monthly recruiter salary: SGD {monthly_salary}

Use these to calculate concrete savings:
- Hours saved = total unique conversations × manual screening minutes / 60
- Cost saved = hours saved × cost per recruiter hour
- FTE equivalent = hours saved / (working hours per day × 22 working days)
"#;
