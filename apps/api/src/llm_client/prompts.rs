// Shared prompt fragments. Each generation module keeps its own template in a
// prompts.rs alongside it; the pieces both templates interpolate live here.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::clients::PromptKpiNames;
use crate::report::{FunnelStage, Kpis};

/// Number of reasons quoted per section.
pub const TOP_REASONS: usize = 5;

/// Substitutes `{name}` placeholders in a single pass. Inserted values are
/// never rescanned, so braces in report data or user text reach the model
/// verbatim. Unknown placeholders are left as written.
pub fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));
    re.replace_all(template, |caps: &Captures| {
        values
            .iter()
            .find(|(name, _)| *name == &caps[1])
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// The user's extra instructions, or nothing when blank.
pub fn instructions_block(custom_instructions: Option<&str>) -> String {
    match custom_instructions.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => format!("\n\n**Additional Instructions from User:**\n{text}\n"),
        None => String::new(),
    }
}

/// KPI bullet list with the client's names for the two client-specific rates.
pub fn kpi_lines(kpis: &Kpis, names: &PromptKpiNames) -> String {
    [
        format!(
            "- Total Unique Conversations: {}",
            kpis.total_unique_conversations
        ),
        format!(
            "- Details Completion Rate: {}%",
            kpis.details_completion_rate
        ),
        format!("- {}: {}%", names.site_rec, kpis.site_recommendation_rate),
        format!(
            "- Conversion Rate (Booked Appointment): {}%",
            kpis.conversion_rate
        ),
        format!("- Human Escalation Rate: {}%", kpis.human_escalation_rate),
        format!("- {}: {}%", names.kiv, kpis.kiv_rate),
        format!("- AI Autonomy Rate: {}%", kpis.ai_autonomy_rate),
    ]
    .join("\n")
}

pub fn funnel_lines(funnel: &[FunnelStage]) -> String {
    funnel
        .iter()
        .map(|f| {
            format!(
                "- {}: {} candidates ({}% drop-off)",
                f.stage, f.count, f.dropoff_pct
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `"no-show (5), ineligible (3)"`, most frequent first, at most `limit`.
pub fn top_reasons(reasons: &BTreeMap<String, u64>, limit: usize) -> String {
    let mut entries: Vec<(&String, &u64)> = reasons.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1));
    entries
        .into_iter()
        .take(limit)
        .map(|(reason, count)| format!("{reason} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_block_blank_is_empty() {
        assert_eq!(instructions_block(None), "");
        assert_eq!(instructions_block(Some("   ")), "");
        assert!(instructions_block(Some("Be brief")).contains("Be brief"));
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let filled = fill_template(
            "A: {first}\nB: {second}\nC: {unknown}",
            &[
                ("first", "{second}".to_string()),
                ("second", "two".to_string()),
            ],
        );
        assert_eq!(filled, "A: {second}\nB: two\nC: {unknown}");
    }

    #[test]
    fn test_top_reasons_sorted_and_limited() {
        let mut reasons = BTreeMap::new();
        for (i, name) in ["a", "b", "c", "d", "e", "f"].iter().enumerate() {
            reasons.insert(name.to_string(), i as u64 + 1);
        }
        assert_eq!(
            top_reasons(&reasons, TOP_REASONS),
            "f (6), e (5), d (4), c (3), b (2)"
        );
    }

    #[test]
    fn test_kpi_lines_use_client_names() {
        let names = PromptKpiNames {
            site_rec: "Eligibility Rate".to_string(),
            kiv: "Rejection Rate".to_string(),
        };
        let kpis = Kpis {
            site_recommendation_rate: 40.5,
            kiv_rate: 3.0,
            ..Default::default()
        };
        let lines = kpi_lines(&kpis, &names);
        assert!(lines.contains("- Eligibility Rate: 40.5%"));
        assert!(lines.contains("- Rejection Rate: 3%"));
    }
}
