// Built-in client profiles. Extra clients are added through CLIENTS_CONFIG_PATH
// rather than by editing this file.

use super::{
    Benchmarks, ClientProfile, InsightsProfile, KivSectionProfile, KpiLabel, KpiLabels,
    PromptKpiNames, SuccessStoryProfile,
};

pub fn profiles() -> Vec<ClientProfile> {
    vec![henderson(), call_lade()]
}

fn henderson() -> ClientProfile {
    ClientProfile {
        id: "henderson".to_string(),
        name: "Henderson Security".to_string(),
        industry: "Security Services".to_string(),
        report_title: "Henderson Security".to_string(),
        breakdown_subtitle: "Henderson Security — candidate preference distribution".to_string(),
        breakdown_titles: [
            "Area Preference".to_string(),
            "Shift Preference".to_string(),
            "Permanent vs Relief".to_string(),
        ],
        kpi_labels: KpiLabels {
            site_recommendation: KpiLabel {
                label: "Site Rec. Rate".to_string(),
                subtitle_template: "{n} recommended".to_string(),
            },
            kiv: KpiLabel {
                label: "KIV Rate".to_string(),
                subtitle_template: "{n} candidates".to_string(),
            },
        },
        insights: InsightsProfile {
            context: "Henderson Security's AI chatbot recruitment system (PilotPulse) for security guard recruitment".to_string(),
            focus: "conversion improvement, escalation reduction, trend patterns, funnel bottlenecks, KIV follow-up potential".to_string(),
            kpi_names: PromptKpiNames {
                site_rec: "Site Recommendation Rate".to_string(),
                kiv: "KIV Rate".to_string(),
            },
            default_instructions: "You are analyzing Henderson Security's AI chatbot recruitment system (PilotPulse) for security guard recruitment.

Focus on: conversion improvement, escalation reduction, trend patterns across weeks, funnel bottlenecks, and KIV follow-up potential.

Provide actionable recommendations that help improve the chatbot's recruitment performance.".to_string(),
        },
        kiv_section: KivSectionProfile {
            title: "KIV Analysis".to_string(),
            subtitle: "Candidates marked as \"Keep In View\" — pending follow-up".to_string(),
            empty_message: "No KIV candidates in this period.".to_string(),
        },
        success_story: SuccessStoryProfile {
            role_description: "security guards across multiple sites".to_string(),
            company_context: "Henderson Security, a leading security services provider in Singapore".to_string(),
            default_benchmarks: Benchmarks {
                cost_per_recruiter_hour: 25.0,
                manual_screening_minutes: 30.0,
                recruiter_hours_per_day: 8.0,
                monthly_recruiter_salary: 4000.0,
            },
            default_instructions: "Write an investor-facing success story for Henderson Security's AI-powered recruitment chatbot (PilotPulse) that screens security guard candidates.

Focus on: cost savings from AI-driven screening, 24/7 availability replacing manual recruiter hours, conversion efficiency from chatbot to booked appointments, AI autonomy rate, and scalability across multiple security sites.

Tone: professional, data-driven, confident but not hyperbolic. Suitable for investor presentations.".to_string(),
        },
    }
}

fn call_lade() -> ClientProfile {
    ClientProfile {
        id: "call_lade".to_string(),
        name: "Call Lade HR".to_string(),
        industry: "Logistics & Haulage".to_string(),
        report_title: "Call Lade HR".to_string(),
        breakdown_subtitle: "Call Lade HR — candidate distribution".to_string(),
        breakdown_titles: [
            "Job Title".to_string(),
            "Need Work Pass".to_string(),
            "Eligibility Status".to_string(),
        ],
        kpi_labels: KpiLabels {
            site_recommendation: KpiLabel {
                label: "Eligibility Rate".to_string(),
                subtitle_template: "{n} eligible".to_string(),
            },
            kiv: KpiLabel {
                label: "Rejection Rate".to_string(),
                subtitle_template: "{n} rejected".to_string(),
            },
        },
        insights: InsightsProfile {
            context: "Call Lade HR's AI chatbot recruitment system (PilotPulse) for logistics and haulage roles (Prime Mover Driver, Lashing Specialist, Reefer Technician, IGH)".to_string(),
            focus: "conversion improvement, eligibility criteria optimization, escalation reduction, trend patterns, rejection analysis".to_string(),
            kpi_names: PromptKpiNames {
                site_rec: "Eligibility Rate".to_string(),
                kiv: "Rejection Rate".to_string(),
            },
            default_instructions: "You are analyzing Call Lade HR's AI chatbot recruitment system (PilotPulse) for logistics and haulage roles (Prime Mover Driver, Lashing Specialist, Reefer Technician, IGH).

Focus on: conversion improvement, eligibility criteria optimization, escalation reduction, trend patterns, and rejection analysis.

Provide actionable recommendations that help improve the chatbot's recruitment performance for logistics roles.".to_string(),
        },
        kiv_section: KivSectionProfile {
            title: "Rejection Analysis".to_string(),
            subtitle: "Candidates marked as \"Rejected\" — did not meet eligibility criteria".to_string(),
            empty_message: "No rejected candidates in this period.".to_string(),
        },
        success_story: SuccessStoryProfile {
            role_description: "logistics and haulage roles (Prime Mover Drivers, Lashing Specialists, Reefer Technicians, IGH)".to_string(),
            company_context: "Call Lade HR, a logistics and haulage recruitment specialist".to_string(),
            default_benchmarks: Benchmarks {
                cost_per_recruiter_hour: 28.0,
                manual_screening_minutes: 35.0,
                recruiter_hours_per_day: 8.0,
                monthly_recruiter_salary: 4500.0,
            },
            default_instructions: "Write an investor-facing success story for Call Lade HR's AI-powered recruitment chatbot (PilotPulse) that screens logistics and haulage candidates (Prime Mover Drivers, Lashing Specialists, Reefer Technicians, IGH).

Focus on: cost savings from AI-driven screening, 24/7 availability, eligibility pre-screening efficiency, conversion from chatbot to booked appointments, and scalability across multiple logistics roles.

Tone: professional, data-driven, confident but not hyperbolic. Suitable for investor presentations.".to_string(),
        },
    }
}
