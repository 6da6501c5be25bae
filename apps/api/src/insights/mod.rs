//! AI observations: five short findings phrased by the LLM from the
//! aggregate the webhook already computed.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clients::ClientProfile;
use crate::errors::AppError;
use crate::insights::prompts::INSIGHTS_PROMPT_TEMPLATE;
use crate::llm_client::prompts::{
    fill_template, funnel_lines, instructions_block, kpi_lines, top_reasons, TOP_REASONS,
};
use crate::llm_client::{extract_json_array, TextGenerator, INSIGHTS_MODEL};
use crate::report::{FunnelStage, Kpis, ReasonSection, ReportAggregate, TrendPoint};

const KNOWN_KINDS: [&str; 3] = ["positive", "warning", "insight"];

/// One observation. `kind` is `positive`, `warning` or `insight`; anything
/// else is kept verbatim and displayed as `insight`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Insight {
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Insight {
    pub fn new(title: impl Into<String>, body: impl Into<String>, kind: &str) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            kind: kind.to_string(),
        }
    }

    pub fn display_kind(&self) -> &str {
        if KNOWN_KINDS.contains(&self.kind.as_str()) {
            &self.kind
        } else {
            "insight"
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsRequest {
    pub client_id: String,
    pub custom_instructions: Option<String>,
    pub kpis: Kpis,
    pub trends: Vec<TrendPoint>,
    pub funnel: Vec<FunnelStage>,
    pub escalation: ReasonSection,
    pub kiv: ReasonSection,
}

impl InsightsRequest {
    pub fn from_report(
        client_id: &str,
        custom_instructions: Option<String>,
        report: &ReportAggregate,
    ) -> Self {
        Self {
            client_id: client_id.to_string(),
            custom_instructions,
            kpis: report.kpis.clone(),
            trends: report.trends.clone(),
            funnel: report.funnel.clone(),
            escalation: report.escalation.clone(),
            kiv: report.kiv.clone(),
        }
    }
}

fn trend_lines(trends: &[TrendPoint]) -> String {
    trends
        .iter()
        .map(|t| {
            format!(
                "- {}: {} conversations, {}% conversion, {}% details, {}% escalation, {} booked",
                t.period, t.total, t.conversion_rate, t.details_rate, t.escalation_rate, t.booked
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_insights_prompt(client: &ClientProfile, request: &InsightsRequest) -> String {
    let names = &client.insights.kpi_names;
    fill_template(
        INSIGHTS_PROMPT_TEMPLATE,
        &[
            ("context", client.insights.context.clone()),
            ("kpi_lines", kpi_lines(&request.kpis, names)),
            ("funnel_lines", funnel_lines(&request.funnel)),
            ("trend_lines", trend_lines(&request.trends)),
            ("escalation_total", request.escalation.total.to_string()),
            ("escalation_rate", request.escalation.rate.to_string()),
            (
                "escalation_reasons",
                top_reasons(&request.escalation.reasons, TOP_REASONS),
            ),
            ("kiv_name", names.kiv.clone()),
            ("kiv_total", request.kiv.total.to_string()),
            ("kiv_rate", request.kiv.rate.to_string()),
            ("kiv_reasons", top_reasons(&request.kiv.reasons, TOP_REASONS)),
            ("focus", client.insights.focus.clone()),
            (
                "instructions_block",
                instructions_block(request.custom_instructions.as_deref()),
            ),
        ],
    )
}

/// Calls the LLM and returns the parsed observations. A reply without a
/// JSON array yields an empty list, not an error.
pub async fn generate_insights(
    llm: &dyn TextGenerator,
    client: &ClientProfile,
    request: &InsightsRequest,
) -> Result<Vec<Insight>, AppError> {
    let prompt = build_insights_prompt(client, request);
    info!("Generating insights for client '{}'", client.id);

    let text = llm.complete(&prompt, INSIGHTS_MODEL).await?;
    match extract_json_array::<Insight>(&text) {
        Some(insights) => {
            info!("Received {} insights", insights.len());
            Ok(insights)
        }
        None => {
            warn!("Insights response contained no JSON array");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::clients::ClientRegistry;

    fn sample_request(client_id: &str) -> InsightsRequest {
        let mut reasons = BTreeMap::new();
        reasons.insert("ineligible".to_string(), 3);
        reasons.insert("no-show".to_string(), 5);
        InsightsRequest {
            client_id: client_id.to_string(),
            custom_instructions: None,
            kpis: Kpis {
                total_unique_conversations: 120,
                site_recommendation_rate: 41.2,
                kiv_rate: 5.0,
                ..Default::default()
            },
            trends: vec![TrendPoint {
                period: "W10".to_string(),
                total: 60,
                conversion_rate: 20.0,
                details_rate: 70.0,
                escalation_rate: 8.0,
                booked: 12,
            }],
            funnel: vec![],
            escalation: ReasonSection {
                total: 8,
                rate: 6.7,
                reasons,
            },
            kiv: ReasonSection::default(),
        }
    }

    #[test]
    fn test_call_lade_prompt_uses_client_vocabulary() {
        let registry = ClientRegistry::builtin();
        let prompt = build_insights_prompt(
            registry.resolve("call_lade"),
            &sample_request("call_lade"),
        );
        assert!(prompt.contains("Eligibility Rate"));
        assert!(prompt.contains("Rejection Rate"));
        assert!(!prompt.contains("Site Recommendation Rate"));
        assert!(!prompt.contains("KIV Rate"));
        assert!(prompt.contains("logistics and haulage roles"));
    }

    #[test]
    fn test_henderson_prompt_uses_default_vocabulary() {
        let registry = ClientRegistry::builtin();
        let prompt = build_insights_prompt(
            registry.resolve("henderson"),
            &sample_request("henderson"),
        );
        assert!(prompt.contains("- Site Recommendation Rate: 41.2%"));
        assert!(prompt.contains("**KIV Rate:** 0 total (0%)"));
    }

    #[test]
    fn test_prompt_lists_reasons_by_count() {
        let registry = ClientRegistry::builtin();
        let prompt = build_insights_prompt(
            registry.resolve("henderson"),
            &sample_request("henderson"),
        );
        assert!(prompt.contains("Top reasons: no-show (5), ineligible (3)"));
        assert!(prompt.contains(
            "- W10: 60 conversations, 20% conversion, 70% details, 8% escalation, 12 booked"
        ));
    }

    #[test]
    fn test_custom_instructions_are_not_reinterpolated() {
        let registry = ClientRegistry::builtin();
        let mut request = sample_request("henderson");
        request.custom_instructions = Some("Mention {focus} literally".to_string());
        let prompt = build_insights_prompt(registry.resolve("henderson"), &request);
        assert!(prompt.contains("**Additional Instructions from User:**\nMention {focus} literally"));
    }

    #[test]
    fn test_braces_in_report_labels_are_not_reinterpolated() {
        let registry = ClientRegistry::builtin();
        let mut request = sample_request("henderson");
        request
            .escalation
            .reasons
            .insert("asked about {kiv_name}".to_string(), 9);
        request.trends[0].period = "{focus}".to_string();
        let prompt = build_insights_prompt(registry.resolve("henderson"), &request);
        assert!(prompt.contains("Top reasons: asked about {kiv_name} (9), no-show (5)"));
        assert!(prompt.contains("- {focus}: 60 conversations"));
    }

    #[test]
    fn test_unknown_kind_displays_as_insight() {
        let insight = Insight::new("t", "b", "celebration");
        assert_eq!(insight.display_kind(), "insight");
        assert_eq!(Insight::new("t", "b", "warning").display_kind(), "warning");
    }
}
