use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Aggregate computed by the external analytics webhook.
///
/// Trusted once received. Every field defaults so that the webhook's
/// `{ "empty": true, "message": "..." }` reply deserialises into the same type.
/// Sections the webhook sends as `null` decode as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportAggregate {
    pub client: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub period: Period,
    #[serde(deserialize_with = "null_as_default")]
    pub dedup_summary: DedupSummary,
    pub empty: bool,
    pub message: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub kpis: Kpis,
    #[serde(deserialize_with = "null_as_default")]
    pub funnel: Vec<FunnelStage>,
    #[serde(deserialize_with = "null_as_default")]
    pub breakdowns: Breakdowns,
    #[serde(deserialize_with = "null_as_default")]
    pub escalation: ReasonSection,
    #[serde(deserialize_with = "null_as_default")]
    pub kiv: ReasonSection,
    #[serde(deserialize_with = "null_as_default")]
    pub trends: Vec<TrendPoint>,
    pub monthly_trends: Option<Vec<TrendPoint>>,
}

/// ISO dates (`YYYY-MM-DD`) as sent by the webhook.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Period {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DedupSummary {
    pub raw: u64,
    pub filtered: u64,
    pub unique: u64,
    pub removed: u64,
}

impl DedupSummary {
    /// `unique = filtered - removed` and `filtered <= raw`.
    pub fn is_consistent(&self) -> bool {
        self.filtered <= self.raw
            && self.removed <= self.filtered
            && self.unique == self.filtered - self.removed
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Kpis {
    pub total_unique_conversations: u64,
    pub details_completion_rate: f64,
    pub site_recommendation_rate: f64,
    pub conversion_rate: f64,
    pub human_escalation_rate: f64,
    pub kiv_rate: f64,
    pub ai_autonomy_rate: f64,
    pub details_completed: u64,
    pub site_recommended: u64,
    pub booked_appointment: u64,
    pub escalated: u64,
    pub kiv: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FunnelStage {
    pub stage: String,
    pub stage_num: u32,
    pub count: u64,
    /// Percentage lost relative to the previous stage.
    pub dropoff_pct: f64,
    pub dropoff_from_previous: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Breakdowns {
    #[serde(deserialize_with = "null_as_default")]
    pub area: BTreeMap<String, u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub shift: BTreeMap<String, u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub perm_relief: BTreeMap<String, u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub floater: Floater,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Floater {
    pub yes: u64,
    pub no: u64,
}

/// Escalation and KIV sections share this shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReasonSection {
    pub total: u64,
    pub rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub reasons: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrendPoint {
    pub period: String,
    pub total: u64,
    pub conversion_rate: f64,
    pub details_rate: f64,
    pub escalation_rate: f64,
    pub booked: u64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Rounds to one decimal place, the precision the dashboard shows.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Builds funnel stages from raw counts, computing each stage's drop-off
/// relative to the stage before it. The first stage has no drop-off.
pub fn compute_dropoffs(stages: &[(&str, u64)]) -> Vec<FunnelStage> {
    let mut previous: Option<u64> = None;
    stages
        .iter()
        .enumerate()
        .map(|(i, (name, count))| {
            let (dropoff_pct, dropoff_from_previous) = match previous {
                Some(prev) if prev > 0 => {
                    let lost = prev.saturating_sub(*count);
                    (round1(lost as f64 / prev as f64 * 100.0), lost)
                }
                _ => (0.0, 0),
            };
            previous = Some(*count);
            FunnelStage {
                stage: name.to_string(),
                stage_num: i as u32 + 1,
                count: *count,
                dropoff_pct,
                dropoff_from_previous,
            }
        })
        .collect()
}

/// Fills `stage_num` and the drop-off fields of stages that arrived without
/// them. A stage is treated as missing its drop-off when it lost conversations
/// against the previous stage but reports neither a percentage nor a count.
pub fn fill_missing_dropoffs(stages: &mut [FunnelStage]) {
    let computed = compute_dropoffs(
        &stages
            .iter()
            .map(|s| (s.stage.as_str(), s.count))
            .collect::<Vec<_>>(),
    );
    for (stage, derived) in stages.iter_mut().zip(computed) {
        if stage.stage_num == 0 {
            stage.stage_num = derived.stage_num;
        }
        if stage.dropoff_pct == 0.0 && stage.dropoff_from_previous == 0 {
            stage.dropoff_pct = derived.dropoff_pct;
            stage.dropoff_from_previous = derived.dropoff_from_previous;
        }
    }
}

/// Stage counts must never grow along the funnel.
pub fn is_non_increasing(stages: &[FunnelStage]) -> bool {
    stages.windows(2).all(|w| w[1].count <= w[0].count)
}
