use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One run exactly as it appears in a source log.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawRun {
    pub date: String,
    pub distance: f64,
    #[serde(alias = "Time")]
    pub total_time: String,
    #[serde(default)]
    pub average_pace: Option<String>,
    #[serde(default)]
    pub avg_heart_rate: Option<u32>,
    #[serde(default)]
    pub run_type: Option<String>,
    #[serde(default)]
    pub terrain_type: Option<String>,
    #[serde(default)]
    pub felt: Option<serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A run whose date and total time have been parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub date: NaiveDate,
    pub distance: f64,
    pub total_time: String,
    pub total_seconds: u32,
    pub average_pace: Option<String>,
    pub pace_seconds: Option<u32>,
    pub avg_heart_rate: Option<u32>,
    pub run_type: Option<String>,
    pub terrain_type: Option<String>,
    pub felt: Option<serde_json::Value>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceMethod {
    /// Total time divided by total distance.
    #[default]
    Total,
    /// Mean of each run's logged pace.
    PerRun,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingBlock {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub data_file: String,
    pub training_start: Option<NaiveDate>,
    pub race_date: Option<NaiveDate>,
    pub weekly_mile_goal: f64,
    pub weekly_time_goal: u64,
    pub pace_method: PaceMethod,
}

#[derive(Debug, Clone)]
pub struct LoadedBlock {
    pub block: TrainingBlock,
    pub runs: Vec<Run>,
    pub rejected: Vec<RecordError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordError {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_miles: f64,
    pub total_seconds: u64,
    /// `None` when no distance was logged.
    pub avg_pace_seconds: Option<f64>,
    /// `None` when no run carries a pace.
    pub avg_pace_from_pace_field: Option<f64>,
    pub avg_heart_rate: f64,
    pub run_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WeekTotals {
    pub miles: f64,
    pub time: u64,
}

pub type WeekBuckets = BTreeMap<String, WeekTotals>;
pub type MonthBuckets = BTreeMap<String, f64>;

#[derive(Debug, Serialize)]
pub struct SummaryCard {
    pub total_miles: f64,
    pub total_time: String,
    pub avg_pace: Option<String>,
    pub avg_heart_rate: u32,
    pub run_count: usize,
}

#[derive(Debug, Serialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub miles: f64,
    pub time: u64,
    pub time_label: String,
    pub miles_progress: f64,
    pub time_progress: f64,
}

#[derive(Debug, Serialize)]
pub struct DistancePoint {
    pub date: String,
    pub miles: f64,
}

#[derive(Debug, Serialize)]
pub struct RunCard {
    pub date: String,
    pub distance: f64,
    pub time: String,
    pub pace: Option<String>,
    pub avg_heart_rate: Option<u32>,
    pub run_type: Option<String>,
    pub terrain_type: Option<String>,
    pub felt: Option<serde_json::Value>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RaceResult {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    pub pace_method: PaceMethod,
    pub weekly_mile_goal: f64,
    pub weekly_time_goal: u64,
    pub stats: SummaryStats,
    pub summary: SummaryCard,
    pub weekly: Vec<WeeklyPoint>,
    pub max_week_miles: f64,
    pub max_week_time: u64,
    pub monthly_miles: MonthBuckets,
    pub distance_over_time: Vec<DistancePoint>,
    pub runs: Vec<RunCard>,
    pub race_result: Option<RaceResult>,
    pub rejected_records: usize,
}

#[derive(Debug, Serialize)]
pub struct BlockListing {
    pub slug: String,
    pub title: String,
    pub run_count: usize,
    pub rejected_records: usize,
}
