//! Per-client configuration table.
//!
//! Every client-specific string (scorecard labels, prompt vocabulary, section
//! titles, ROI benchmark defaults) lives in a `ClientProfile`. `AppState`
//! carries one `ClientRegistry`; handlers resolve a profile by client id and
//! never branch on the id themselves.

pub mod builtin;
pub mod handlers;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Client used when a request names an unknown id.
pub const DEFAULT_CLIENT_ID: &str = "henderson";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KpiLabel {
    pub label: String,
    /// Subtitle with a `{n}` placeholder for the underlying count.
    pub subtitle_template: String,
}

impl KpiLabel {
    pub fn subtitle(&self, n: u64) -> String {
        self.subtitle_template.replace("{n}", &n.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KpiLabels {
    pub site_recommendation: KpiLabel,
    pub kiv: KpiLabel,
}

/// KPI names as they appear inside LLM prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptKpiNames {
    pub site_rec: String,
    pub kiv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightsProfile {
    pub context: String,
    pub focus: String,
    pub kpi_names: PromptKpiNames,
    pub default_instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KivSectionProfile {
    pub title: String,
    pub subtitle: String,
    pub empty_message: String,
}

/// Manual-recruitment benchmarks used for the ROI block of a success story.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Benchmarks {
    pub cost_per_recruiter_hour: f64,
    pub manual_screening_minutes: f64,
    pub recruiter_hours_per_day: f64,
    pub monthly_recruiter_salary: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessStoryProfile {
    pub role_description: String,
    pub company_context: String,
    pub default_benchmarks: Benchmarks,
    pub default_instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientProfile {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub report_title: String,
    pub breakdown_subtitle: String,
    pub breakdown_titles: [String; 3],
    pub kpi_labels: KpiLabels,
    pub insights: InsightsProfile,
    pub kiv_section: KivSectionProfile,
    pub success_story: SuccessStoryProfile,
}

/// Ordered lookup table of client profiles.
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    profiles: Vec<ClientProfile>,
}

impl ClientRegistry {
    pub fn new(profiles: Vec<ClientProfile>) -> Self {
        Self { profiles }
    }

    pub fn builtin() -> Self {
        Self::new(builtin::profiles())
    }

    /// Merges profiles from a JSON array file. Matching ids are replaced in
    /// place; new ids are appended in file order.
    pub fn load_overrides(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read client profiles from {}", path.display()))?;
        let overrides: Vec<ClientProfile> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid client profiles in {}", path.display()))?;

        for profile in overrides {
            info!("Loaded client profile '{}' from {}", profile.id, path.display());
            self.upsert(profile);
        }
        Ok(())
    }

    pub fn upsert(&mut self, profile: ClientProfile) {
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ClientProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Unknown ids fall back to the default client, then to the first profile.
    pub fn resolve(&self, id: &str) -> &ClientProfile {
        self.get(id)
            .or_else(|| self.get(DEFAULT_CLIENT_ID))
            .unwrap_or(&self.profiles[0])
    }

    pub fn list(&self) -> &[ClientProfile] {
        &self.profiles
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
