use crate::calendar::{date_key, generate_weeks, month_key_for_date, week_key, week_key_for_date};
use crate::duration::{
    duration_label_from_seconds, duration_string_from_seconds, pace_string_from_seconds,
};
use crate::models::{
    Dashboard, DistancePoint, MonthBuckets, PaceMethod, RaceResult, Run, RunCard, SummaryCard,
    SummaryStats, TrainingBlock, WeekBuckets, WeekTotals, WeeklyPoint,
};
use chrono::NaiveDate;

/// Runs dated within `start..=end`, in their original order.
pub fn filter_runs_in_range(runs: &[Run], start: NaiveDate, end: NaiveDate) -> Vec<&Run> {
    runs.iter()
        .filter(|run| start <= run.date && run.date <= end)
        .collect()
}

pub fn aggregate<'a, I>(runs: I) -> SummaryStats
where
    I: IntoIterator<Item = &'a Run>,
{
    let mut total_miles = 0.0;
    let mut total_seconds = 0u64;
    let mut heart_rate_sum = 0u64;
    let mut pace_sum = 0u64;
    let mut paced_runs = 0usize;
    let mut run_count = 0usize;

    for run in runs {
        run_count += 1;
        total_miles += run.distance;
        total_seconds += u64::from(run.total_seconds);
        heart_rate_sum += u64::from(run.avg_heart_rate.unwrap_or(0));
        if let Some(pace) = run.pace_seconds {
            pace_sum += u64::from(pace);
            paced_runs += 1;
        }
    }

    let avg_pace_seconds = if total_miles > 0.0 {
        Some(total_seconds as f64 / total_miles)
    } else {
        None
    };
    let avg_pace_from_pace_field = if paced_runs > 0 {
        Some(pace_sum as f64 / paced_runs as f64)
    } else {
        None
    };

    SummaryStats {
        total_miles,
        total_seconds,
        avg_pace_seconds,
        avg_pace_from_pace_field,
        avg_heart_rate: heart_rate_sum as f64 / run_count.max(1) as f64,
        run_count,
    }
}

/// Miles and time per week anchor. Every anchor is present; runs outside the anchors are
/// left out of this view.
pub fn aggregate_by_week<'a, I>(runs: I, anchors: &[NaiveDate]) -> WeekBuckets
where
    I: IntoIterator<Item = &'a Run>,
{
    let mut weeks: WeekBuckets = anchors
        .iter()
        .map(|anchor| (date_key(*anchor), WeekTotals::default()))
        .collect();

    for run in runs {
        if let Some(totals) = weeks.get_mut(&week_key(run.date)) {
            totals.miles += run.distance;
            totals.time += u64::from(run.total_seconds);
        }
    }

    weeks
}

pub fn aggregate_by_month<'a, I>(runs: I) -> MonthBuckets
where
    I: IntoIterator<Item = &'a Run>,
{
    let mut months = MonthBuckets::new();
    for run in runs {
        *months.entry(month_key_for_date(run.date)).or_insert(0.0) += run.distance;
    }
    months
}

/// Share of `goal` reached, capped at 100.
pub fn progress_percent(value: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 100.0;
    }
    (value / goal * 100.0).min(100.0)
}

pub fn build_dashboard(block: &TrainingBlock, runs: &[Run]) -> Dashboard {
    build_dashboard_with_rejections(block, runs, 0)
}

pub fn build_dashboard_with_rejections(
    block: &TrainingBlock,
    runs: &[Run],
    rejected_records: usize,
) -> Dashboard {
    let range = training_range(block, runs);
    let in_range = match range {
        Some((start, end)) => filter_runs_in_range(runs, start, end),
        None => Vec::new(),
    };

    let stats = aggregate(in_range.iter().copied());
    let display_pace = match block.pace_method {
        PaceMethod::Total => stats.avg_pace_seconds,
        PaceMethod::PerRun => stats.avg_pace_from_pace_field,
    };

    let anchors: Vec<NaiveDate> = match range {
        Some((start, end)) => generate_weeks(week_key_for_date(start), end).collect(),
        None => Vec::new(),
    };
    let buckets = aggregate_by_week(in_range.iter().copied(), &anchors);

    let weekly: Vec<WeeklyPoint> = anchors
        .iter()
        .map(|anchor| {
            let week = date_key(*anchor);
            let totals = buckets.get(&week).copied().unwrap_or_default();
            WeeklyPoint {
                miles_progress: progress_percent(totals.miles, block.weekly_mile_goal),
                time_progress: progress_percent(totals.time as f64, block.weekly_time_goal as f64),
                time_label: duration_string_from_seconds(totals.time),
                miles: totals.miles,
                time: totals.time,
                week,
            }
        })
        .collect();

    let max_week_miles = weekly.iter().map(|w| w.miles).fold(1.0, f64::max);
    let max_week_time = weekly.iter().map(|w| w.time).fold(1, u64::max);

    let race_result = block.race_date.and_then(|race_date| {
        in_range
            .iter()
            .rev()
            .find(|run| run.date == race_date)
            .map(|run| RaceResult {
                date: date_key(run.date),
                time: run.total_time.clone(),
            })
    });

    Dashboard {
        slug: block.slug.clone(),
        title: block.title.clone(),
        description: block.description.clone(),
        range_start: range.map(|(start, _)| date_key(start)),
        range_end: range.map(|(_, end)| date_key(end)),
        pace_method: block.pace_method,
        weekly_mile_goal: block.weekly_mile_goal,
        weekly_time_goal: block.weekly_time_goal,
        summary: SummaryCard {
            total_miles: stats.total_miles,
            total_time: duration_label_from_seconds(stats.total_seconds),
            avg_pace: display_pace.map(pace_string_from_seconds),
            avg_heart_rate: stats.avg_heart_rate.round() as u32,
            run_count: stats.run_count,
        },
        stats,
        weekly,
        max_week_miles,
        max_week_time,
        monthly_miles: aggregate_by_month(in_range.iter().copied()),
        distance_over_time: in_range
            .iter()
            .map(|run| DistancePoint {
                date: date_key(run.date),
                miles: run.distance,
            })
            .collect(),
        runs: in_range.iter().map(|run| run_card(run)).collect(),
        race_result,
        rejected_records,
    }
}

/// Configured range, with missing bounds taken from the earliest and latest run.
fn training_range(block: &TrainingBlock, runs: &[Run]) -> Option<(NaiveDate, NaiveDate)> {
    let earliest = runs.iter().map(|run| run.date).min();
    let latest = runs.iter().map(|run| run.date).max();
    let start = block.training_start.or(earliest)?;
    let end = block.race_date.or(latest)?;
    Some((start, end))
}

fn run_card(run: &Run) -> RunCard {
    RunCard {
        date: date_key(run.date),
        distance: run.distance,
        time: run.total_time.clone(),
        pace: run.average_pace.clone(),
        avg_heart_rate: run.avg_heart_rate,
        run_type: run.run_type.clone(),
        terrain_type: run.terrain_type.clone(),
        felt: run.felt.clone(),
        notes: run.notes.clone(),
    }
}
