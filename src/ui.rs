use crate::models::{BlockListing, Dashboard, DistancePoint, MonthBuckets, RunCard, WeeklyPoint};

pub fn render_index(blocks: &[BlockListing]) -> String {
    let links = if blocks.is_empty() {
        r#"<p class="subtitle">No training blocks configured.</p>"#.to_string()
    } else {
        blocks
            .iter()
            .map(|block| {
                format!(
                    r#"<a class="block-link" href="/blocks/{slug}">{title}<span>{runs} runs</span></a>"#,
                    slug = escape(&block.slug),
                    title = escape(&block.title),
                    runs = block.run_count,
                )
            })
            .collect::<Vec<_>>()
            .join("\n      ")
    };

    PAGE_HTML
        .replace("{{TITLE}}", "Training Log")
        .replace("{{BODY}}", &format!(
            "<header><h1>Training Log</h1></header>\n    <nav class=\"blocks\">\n      {links}\n    </nav>"
        ))
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let summary = &dashboard.summary;
    let mut body = String::new();

    body.push_str(&format!("<header><h1>{}</h1>", escape(&dashboard.title)));
    if let Some(description) = &dashboard.description {
        body.push_str(&format!(r#"<p class="subtitle">{}</p>"#, escape(description)));
    }
    body.push_str("</header>\n");

    if let Some(race) = &dashboard.race_result {
        body.push_str(&format!(
            r#"<section class="card"><h2>Race Result</h2><p>Date: {}</p><p>Time: {}</p></section>"#,
            escape(&race.date),
            escape(&race.time),
        ));
    }

    body.push_str(r#"<section class="panel">"#);
    body.push_str(&stat("Total Miles", &format!("{:.1}", summary.total_miles)));
    body.push_str(&stat("Total Time", &summary.total_time));
    body.push_str(&stat("Avg Pace", summary.avg_pace.as_deref().unwrap_or("-")));
    body.push_str(&stat("Avg HR", &summary.avg_heart_rate.to_string()));
    body.push_str(&stat("Runs", &summary.run_count.to_string()));
    body.push_str("</section>\n");

    body.push_str(&format!(
        r#"<section class="card"><h2>Distance Over Time</h2><svg class="chart" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" aria-label="Distance over time" role="img">{}</svg>{}</section>"#,
        distance_chart(&dashboard.distance_over_time),
        monthly_list(&dashboard.monthly_miles),
    ));
    body.push('\n');

    body.push_str(r#"<section class="card"><h2>Weekly Progression</h2><div class="columns">"#);
    body.push_str(&weekly_column("Miles per Week", "miles", &dashboard.weekly, |week| {
        (format!("{:.1} mi", week.miles), week.miles_progress)
    }));
    body.push_str(&weekly_column("Time per Week", "time", &dashboard.weekly, |week| {
        (week.time_label.clone(), week.time_progress)
    }));
    body.push_str("</div></section>\n");

    body.push_str(r#"<section class="card"><h2>Runs</h2><div class="runs">"#);
    for run in &dashboard.runs {
        body.push_str(&run_card(run));
    }
    body.push_str("</div></section>");

    if dashboard.rejected_records > 0 {
        body.push_str(&format!(
            r#"<p class="subtitle">{} record(s) in the source log could not be read.</p>"#,
            dashboard.rejected_records
        ));
    }

    PAGE_HTML
        .replace("{{TITLE}}", &escape(&dashboard.title))
        .replace("{{BODY}}", &body)
}

fn stat(label: &str, value: &str) -> String {
    format!(
        r#"<div class="stat"><span class="label">{}</span><span class="value">{}</span></div>"#,
        escape(label),
        escape(value)
    )
}

const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 260.0;

/// SVG body for the distance line chart, one point per run.
fn distance_chart(points: &[DistancePoint]) -> String {
    if points.is_empty() {
        return r#"<text class="chart-label" x="50%" y="50%" text-anchor="middle">No runs yet</text>"#
            .to_string();
    }

    let padding_x = 44.0;
    let padding_y = 34.0;
    let top = 24.0;

    let max = points.iter().map(|point| point.miles).fold(0.0, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };
    let x_step = if points.len() > 1 {
        (CHART_WIDTH - padding_x * 2.0) / (points.len() - 1) as f64
    } else {
        0.0
    };
    let scale_y = (CHART_HEIGHT - top - padding_y) / max;
    let x = |index: usize| padding_x + index as f64 * x_step;
    let y = |miles: f64| CHART_HEIGHT - padding_y - miles * scale_y;

    let mut svg = String::new();
    let ticks = 4;
    for tick in 0..=ticks {
        let value = max * tick as f64 / ticks as f64;
        let y_pos = y(value);
        svg.push_str(&format!(
            r#"<line class="chart-grid" x1="{padding_x}" y1="{y_pos:.2}" x2="{}" y2="{y_pos:.2}" />"#,
            CHART_WIDTH - padding_x
        ));
        svg.push_str(&format!(
            r#"<text class="chart-label" x="{}" y="{:.2}" text-anchor="end">{value:.1}</text>"#,
            padding_x - 10.0,
            y_pos + 4.0
        ));
    }

    let path: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let command = if index == 0 { 'M' } else { 'L' };
            format!("{command} {:.2} {:.2}", x(index), y(point.miles))
        })
        .collect();
    svg.push_str(&format!(r#"<path class="chart-line" d="{}" />"#, path.join(" ")));

    let label_every = points.len().div_ceil(8);
    for (index, point) in points.iter().enumerate() {
        svg.push_str(&format!(
            r#"<circle class="chart-point" cx="{:.2}" cy="{:.2}" r="4"><title>{} · {} mi</title></circle>"#,
            x(index),
            y(point.miles),
            escape(&point.date),
            point.miles
        ));
        if index % label_every == 0 {
            let label = point.date.get(5..).unwrap_or(&point.date);
            svg.push_str(&format!(
                r#"<text class="chart-label" x="{:.2}" y="{}" text-anchor="middle">{}</text>"#,
                x(index),
                CHART_HEIGHT - padding_y + 18.0,
                escape(label)
            ));
        }
    }
    svg
}

fn monthly_list(months: &MonthBuckets) -> String {
    let mut entries: Vec<(&String, &f64)> = months.iter().collect();
    entries.sort_by_key(|(key, _)| month_order(key));
    let items: String = entries
        .iter()
        .map(|(month, miles)| {
            format!(
                r#"<div class="stat"><span class="label">{}</span><span class="value">{:.1} mi</span></div>"#,
                escape(month),
                miles
            )
        })
        .collect();
    format!(r#"<div class="months">{items}</div>"#)
}

/// `"2026-3"` sorts before `"2026-10"`.
fn month_order(key: &str) -> (i32, u32) {
    let mut parts = key.splitn(2, '-');
    let year = parts.next().and_then(|y| y.parse().ok()).unwrap_or(0);
    let month = parts.next().and_then(|m| m.parse().ok()).unwrap_or(0);
    (year, month)
}

fn weekly_column<F>(heading: &str, class: &str, weeks: &[WeeklyPoint], describe: F) -> String
where
    F: Fn(&WeeklyPoint) -> (String, f64),
{
    let mut column = format!("<div><h3>{heading}</h3>");
    for week in weeks {
        let (label, progress) = describe(week);
        column.push_str(&format!(
            r#"<div class="week"><div class="week-row"><span>{week}</span><span>{label}</span></div><div class="bar"><div class="fill {class}" style="width: {progress:.1}%"></div></div></div>"#,
            week = escape(&week.week),
            label = escape(&label),
        ));
    }
    column.push_str("</div>");
    column
}

fn run_card(run: &RunCard) -> String {
    let mut details = vec![format!(
        "{} mi · {}/mi",
        run.distance,
        run.pace.as_deref().unwrap_or("-")
    )];
    let kind: Vec<&str> = [run.run_type.as_deref(), run.terrain_type.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !kind.is_empty() {
        details.push(kind.join(" · "));
    }
    let mut vitals = Vec::new();
    if let Some(hr) = run.avg_heart_rate {
        vitals.push(format!("HR {hr}"));
    }
    if let Some(felt) = &run.felt {
        let felt = match felt {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        vitals.push(format!("Felt {felt}/5"));
    }
    if !vitals.is_empty() {
        details.push(vitals.join(" · "));
    }
    if let Some(notes) = &run.notes {
        details.push(notes.clone());
    }

    let lines: String = details
        .iter()
        .map(|line| format!("<p>{}</p>", escape(line)))
        .collect();
    format!(
        r#"<div class="run"><p class="run-date">{} · {}</p>{lines}</div>"#,
        escape(&run.date),
        escape(&run.time)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f8fafc;
      --ink: #1e293b;
      --muted: #64748b;
      --line: #e2e8f0;
      --miles: #f97316;
      --time: #1e293b;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    main {
      width: min(1100px, 100%);
      margin: 0 auto;
      padding: 40px 18px 64px;
      display: grid;
      gap: 32px;
    }

    h1 {
      margin: 0 0 8px;
      font-size: clamp(2rem, 4vw, 2.6rem);
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
    }

    .blocks {
      display: flex;
      flex-wrap: wrap;
      gap: 16px;
    }

    .block-link {
      display: grid;
      gap: 4px;
      padding: 14px 20px;
      border-radius: 12px;
      background: var(--ink);
      color: white;
      text-decoration: none;
      font-weight: 600;
    }

    .block-link span {
      font-size: 0.8rem;
      font-weight: 400;
      opacity: 0.8;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat,
    .card,
    .run {
      background: white;
      border: 1px solid var(--line);
      border-radius: 14px;
      padding: 16px;
    }

    .stat .label {
      display: block;
      font-size: 0.85rem;
      color: var(--muted);
    }

    .stat .value {
      display: block;
      margin-top: 4px;
      font-size: 1.6rem;
      font-weight: 700;
    }

    .columns {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 24px;
    }

    .week {
      padding: 6px 0;
    }

    .week-row {
      display: flex;
      justify-content: space-between;
      font-size: 0.75rem;
      font-weight: 500;
    }

    .bar {
      height: 12px;
      margin-top: 4px;
      background: var(--line);
      border-radius: 999px;
      overflow: hidden;
    }

    .fill {
      height: 100%;
      border-radius: 999px;
    }

    .fill.miles {
      background: var(--miles);
    }

    .fill.time {
      background: var(--time);
    }

    .chart {
      width: 100%;
      height: auto;
    }

    .chart-line {
      fill: none;
      stroke: var(--miles);
      stroke-width: 3;
    }

    .chart-point {
      fill: white;
      stroke: var(--miles);
      stroke-width: 2;
    }

    .chart-grid {
      stroke: var(--line);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .months {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 12px;
      margin-top: 16px;
    }

    .runs {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      gap: 16px;
    }

    .run p {
      margin: 4px 0;
      font-size: 0.9rem;
      color: var(--muted);
    }

    .run .run-date {
      font-weight: 600;
      color: var(--ink);
    }
  </style>
</head>
<body>
  <main>
    {{BODY}}
  </main>
</body>
</html>
"#;
