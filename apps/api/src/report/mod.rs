// Report Aggregate model (produced by the analytics webhook) and the
// presentation model derived from it.

pub mod handlers;
pub mod models;
pub mod view;

pub use models::{
    DedupSummary, FunnelStage, Kpis, Period, ReasonSection, ReportAggregate, TrendPoint,
};
