use crate::calendar::parse_run_date;
use crate::duration::{duration_seconds_from_str, pace_seconds_from_str};
use crate::errors::LoadError;
use crate::models::{LoadedBlock, PaceMethod, RawRun, RecordError, Run, TrainingBlock};
use serde::Deserialize;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info, warn};

const DEFAULT_WEEKLY_MILE_GOAL: f64 = 40.0;
const DEFAULT_WEEKLY_TIME_GOAL: u64 = 7 * 60 * 60;

pub fn resolve_data_dir() -> PathBuf {
    if let Ok(path) = env::var("TRAINING_DATA_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from("data")
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    slug: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    data_file: String,
    #[serde(default)]
    training_start: Option<String>,
    #[serde(default)]
    race_date: Option<String>,
    #[serde(default)]
    weekly_mile_goal: Option<f64>,
    #[serde(default)]
    weekly_time_goal: Option<String>,
    #[serde(default)]
    pace_method: PaceMethod,
}

/// Loads `blocks.json` and every run log it names.
///
/// A missing or broken config yields no blocks; a missing or broken run log yields a
/// block without runs. Both are logged rather than returned.
pub async fn load_blocks(data_dir: &Path) -> Vec<LoadedBlock> {
    let config_path = data_dir.join("blocks.json");
    let blocks = match read_block_config(&config_path).await {
        Ok(blocks) => blocks,
        Err(err) => {
            error!("{err}: {}", error_source(&err));
            return Vec::new();
        }
    };

    let mut loaded = Vec::with_capacity(blocks.len());
    for block in blocks {
        let path = data_dir.join(&block.data_file);
        let (runs, rejected) = match read_runs(&path).await {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("{err}: {}", error_source(&err));
                (Vec::new(), Vec::new())
            }
        };
        for record in &rejected {
            warn!(block = %block.slug, index = record.index, "skipped run record: {}", record.reason);
        }
        info!(
            block = %block.slug,
            runs = runs.len(),
            rejected = rejected.len(),
            "loaded training block"
        );
        loaded.push(LoadedBlock {
            block,
            runs,
            rejected,
        });
    }
    loaded
}

async fn read_block_config(path: &Path) -> Result<Vec<TrainingBlock>, LoadError> {
    let bytes = fs::read(path).await.map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_block_config(&bytes).map_err(|err| match err {
        ConfigError::Json(source) => LoadError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ConfigError::Invalid(err) => err,
    })
}

async fn read_runs(path: &Path) -> Result<(Vec<Run>, Vec<RecordError>), LoadError> {
    let bytes = fs::read(path).await.map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_runs(&bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

enum ConfigError {
    Json(serde_json::Error),
    Invalid(LoadError),
}

fn parse_block_config(bytes: &[u8]) -> Result<Vec<TrainingBlock>, ConfigError> {
    let raw: Vec<RawBlock> = serde_json::from_slice(bytes).map_err(ConfigError::Json)?;
    raw.into_iter()
        .map(|block| validate_block(block).map_err(ConfigError::Invalid))
        .collect()
}

fn validate_block(raw: RawBlock) -> Result<TrainingBlock, LoadError> {
    let invalid = |reason: String| LoadError::InvalidBlock {
        slug: raw.slug.clone(),
        reason,
    };
    let date = |value: &Option<String>, field: &str| match value {
        Some(text) => parse_run_date(text)
            .map(Some)
            .ok_or_else(|| invalid(format!("{field} {text:?} is not a date"))),
        None => Ok(None),
    };

    let training_start = date(&raw.training_start, "training_start")?;
    let race_date = date(&raw.race_date, "race_date")?;
    let weekly_time_goal = match &raw.weekly_time_goal {
        Some(text) => duration_seconds_from_str(text)
            .map(u64::from)
            .map_err(|err| invalid(format!("weekly_time_goal: {err}")))?,
        None => DEFAULT_WEEKLY_TIME_GOAL,
    };

    Ok(TrainingBlock {
        training_start,
        race_date,
        weekly_time_goal,
        weekly_mile_goal: raw.weekly_mile_goal.unwrap_or(DEFAULT_WEEKLY_MILE_GOAL),
        slug: raw.slug,
        title: raw.title,
        description: raw.description,
        data_file: raw.data_file,
        pace_method: raw.pace_method,
    })
}

/// Parses a run log, keeping every record that can be read and reporting the rest.
///
/// Only a document that is not a JSON array fails as a whole.
pub fn parse_runs(bytes: &[u8]) -> Result<(Vec<Run>, Vec<RecordError>), serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
    let mut runs = Vec::with_capacity(values.len());
    let mut rejected = Vec::new();

    for (index, value) in values.into_iter().enumerate() {
        match parse_record(value) {
            Ok(run) => runs.push(run),
            Err(reason) => rejected.push(RecordError { index, reason }),
        }
    }

    Ok((runs, rejected))
}

fn parse_record(value: serde_json::Value) -> Result<Run, String> {
    let raw: RawRun = serde_json::from_value(value).map_err(|err| err.to_string())?;
    let date = parse_run_date(&raw.date).ok_or_else(|| format!("unreadable date {:?}", raw.date))?;
    let total_seconds = duration_seconds_from_str(&raw.total_time)
        .map_err(|err| format!("unreadable total time: {err}"))?;
    if !raw.distance.is_finite() || raw.distance < 0.0 {
        return Err(format!("distance {} is not a non-negative number", raw.distance));
    }

    let pace_seconds = match raw.average_pace.as_deref() {
        Some(pace) => match pace_seconds_from_str(pace) {
            Ok(seconds) => Some(seconds),
            Err(err) => {
                warn!(date = %raw.date, "ignoring pace: {err}");
                None
            }
        },
        None => None,
    };

    Ok(Run {
        date,
        distance: raw.distance,
        total_time: raw.total_time,
        total_seconds,
        average_pace: raw.average_pace,
        pace_seconds,
        avg_heart_rate: raw.avg_heart_rate,
        run_type: raw.run_type,
        terrain_type: raw.terrain_type,
        felt: raw.felt,
        notes: raw.notes,
    })
}

fn error_source(err: &LoadError) -> String {
    std::error::Error::source(err)
        .map(|source| source.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_capitalized_source_records() {
        let json = br#"[
            {"Date": "2026-01-05", "Distance": 5, "TotalTime": "0:45:00", "AveragePace": "9:00",
             "AvgHeartRate": 140, "RunType": "Easy", "TerrainType": "Road", "Felt": 4,
             "Notes": "windy"},
            {"Date": "2026-01-12", "Distance": 6.2, "Time": "54:00", "AveragePace": "8:43"}
        ]"#;
        let (runs, rejected) = parse_runs(json).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(runs.len(), 2);

        let first = &runs[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(first.total_seconds, 2700);
        assert_eq!(first.pace_seconds, Some(540));
        assert_eq!(first.avg_heart_rate, Some(140));
        assert_eq!(first.run_type.as_deref(), Some("Easy"));
        assert_eq!(first.felt, Some(serde_json::json!(4)));

        let second = &runs[1];
        assert_eq!(second.total_time, "54:00");
        assert_eq!(second.total_seconds, 3240);
        assert_eq!(second.avg_heart_rate, None);
    }

    #[test]
    fn bad_records_are_reported_not_fatal() {
        let json = br#"[
            {"Date": "not a date", "Distance": 3, "TotalTime": "27:00"},
            {"Date": "2026-01-06", "Distance": 3, "TotalTime": "27"},
            {"Date": "2026-01-07", "TotalTime": "27:00"},
            {"Date": "2026-01-08", "Distance": -1, "TotalTime": "27:00"},
            {"Date": "2026-01-09", "Distance": 3, "TotalTime": "27:00", "AveragePace": "fast"}
        ]"#;
        let (runs, rejected) = parse_runs(json).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].pace_seconds, None);
        assert_eq!(runs[0].average_pace.as_deref(), Some("fast"));

        let indexes: Vec<usize> = rejected.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
        assert!(rejected[0].reason.contains("date"));
    }

    #[test]
    fn oversized_total_time_rejects_only_that_record() {
        let json = br#"[
            {"Date": "2026-01-05", "Distance": 5, "TotalTime": "0:45:00"},
            {"Date": "2026-01-06", "Distance": 5, "TotalTime": "2000000:00:00"}
        ]"#;
        let (runs, rejected) = parse_runs(json).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].total_seconds, 2700);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].index, 1);
        assert!(rejected[0].reason.contains("too large"));
    }

    #[test]
    fn non_array_document_fails() {
        assert!(parse_runs(br#"{"Date": "2026-01-05"}"#).is_err());
    }

    #[test]
    fn block_config_applies_defaults() {
        let json = br#"[
            {"slug": "madison", "title": "Madison Marathon", "data_file": "madison.json"},
            {"slug": "ultra", "title": "Ultra 50km", "data_file": "ultra50km.json",
             "training_start": "2026-01-05", "race_date": "2026-06-13",
             "weekly_mile_goal": 45, "weekly_time_goal": "8:00:00", "pace_method": "per_run"}
        ]"#;
        let blocks = match parse_block_config(json) {
            Ok(blocks) => blocks,
            Err(_) => panic!("config should parse"),
        };

        assert_eq!(blocks[0].weekly_mile_goal, 40.0);
        assert_eq!(blocks[0].weekly_time_goal, 7 * 3600);
        assert_eq!(blocks[0].pace_method, PaceMethod::Total);
        assert_eq!(blocks[0].training_start, None);

        assert_eq!(blocks[1].race_date, NaiveDate::from_ymd_opt(2026, 6, 13));
        assert_eq!(blocks[1].weekly_mile_goal, 45.0);
        assert_eq!(blocks[1].weekly_time_goal, 8 * 3600);
        assert_eq!(blocks[1].pace_method, PaceMethod::PerRun);
    }

    #[test]
    fn block_config_rejects_bad_dates() {
        let json = br#"[{"slug": "x", "title": "X", "data_file": "x.json", "race_date": "June"}]"#;
        match parse_block_config(json) {
            Err(ConfigError::Invalid(LoadError::InvalidBlock { slug, .. })) => assert_eq!(slug, "x"),
            _ => panic!("expected invalid block"),
        }
    }

    #[tokio::test]
    async fn missing_run_file_yields_empty_block() {
        let dir = std::env::temp_dir().join(format!("training_log_storage_{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();
        fs::write(
            dir.join("blocks.json"),
            br#"[{"slug": "gone", "title": "Gone", "data_file": "missing.json"}]"#,
        )
        .await
        .unwrap();

        let blocks = load_blocks(&dir).await;
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].runs.is_empty());

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn missing_config_yields_no_blocks() {
        let dir = std::env::temp_dir().join("training_log_storage_does_not_exist");
        assert!(load_blocks(&dir).await.is_empty());
    }
}
