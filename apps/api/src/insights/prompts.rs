/// Insights prompt template.
/// Placeholders: {context}, {kpi_lines}, {funnel_lines}, {trend_lines},
///          {escalation_total}, {escalation_rate}, {escalation_reasons},
///          {kiv_name}, {kiv_total}, {kiv_rate}, {kiv_reasons}, {focus},
///          {instructions_block}. Filled in one pass by `fill_template`.
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"You are a recruitment analytics consultant analyzing performance data for {context}.{instructions_block}

Here is the data for this reporting period:

**KPIs:**
{kpi_lines}

**Funnel Stages:**
{funnel_lines}

**Weekly Trends:**
{trend_lines}

**Escalation:** {escalation_total} total ({escalation_rate}%)
Top reasons: {escalation_reasons}

**{kiv_name}:** {kiv_total} total ({kiv_rate}%)
Top reasons: {kiv_reasons}

Based on this data, provide exactly 5 actionable observations and recommendations. Each should:
1. Reference specific numbers and trends from the data
2. Identify what's working well OR what needs improvement
3. Suggest a concrete action to take

Focus on: {focus}.

Return your response as a JSON array of exactly 5 objects with this structure:
[{"title": "Short headline", "body": "2-3 sentence analysis with specific numbers and a concrete recommendation.", "type": "positive|warning|insight"}]

Only return the JSON array, no other text."#;
