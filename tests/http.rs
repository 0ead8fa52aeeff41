use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct BlockListing {
    slug: String,
    run_count: usize,
    rejected_records: usize,
}

#[derive(Debug, Deserialize)]
struct WeekTotals {
    miles: f64,
    time: u64,
}

#[derive(Debug, Deserialize)]
struct SummaryStats {
    total_miles: f64,
    total_seconds: u64,
    avg_pace_seconds: Option<f64>,
    avg_heart_rate: f64,
    run_count: usize,
}

#[derive(Debug, Deserialize)]
struct WeeklyPoint {
    week: String,
    #[serde(flatten)]
    totals: WeekTotals,
}

#[derive(Debug, Deserialize)]
struct Dashboard {
    stats: SummaryStats,
    weekly: Vec<WeeklyPoint>,
    monthly_miles: BTreeMap<String, f64>,
    rejected_records: usize,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn write_fixture_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut dir = std::env::temp_dir();
    dir.push(format!("training_log_http_{}_{}", std::process::id(), nanos));
    std::fs::create_dir_all(&dir).expect("create fixture dir");

    std::fs::write(
        dir.join("blocks.json"),
        r#"[
  {"slug": "ultra", "title": "Ultra 50km Training", "data_file": "ultra.json",
   "training_start": "2026-01-05", "race_date": "2026-01-12"}
]"#,
    )
    .expect("write blocks.json");

    std::fs::write(
        dir.join("ultra.json"),
        r#"[
  {"Date": "2026-01-05", "Distance": 5, "TotalTime": "0:45:00", "AveragePace": "9:00", "AvgHeartRate": 140},
  {"Date": "2026-01-12", "Distance": 6, "TotalTime": "0:54:00", "AveragePace": "9:00", "AvgHeartRate": 150},
  {"Date": "someday", "Distance": 3, "TotalTime": "27:00"}
]"#,
    )
    .expect("write ultra.json");

    dir
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/blocks")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_dir = write_fixture_dir();
    let child = Command::new(env!("CARGO_BIN_EXE_training_log"))
        .env("PORT", port.to_string())
        .env("TRAINING_DATA_DIR", data_dir)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_lists_blocks_with_rejections() {
    let server = shared_server().await;
    let blocks: Vec<BlockListing> = Client::new()
        .get(format!("{}/api/blocks", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].slug, "ultra");
    assert_eq!(blocks[0].run_count, 2);
    assert_eq!(blocks[0].rejected_records, 1);
}

#[tokio::test]
async fn http_block_stats_aggregates_weeks() {
    let server = shared_server().await;
    let dashboard: Dashboard = Client::new()
        .get(format!("{}/api/blocks/ultra/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(dashboard.stats.run_count, 2);
    assert_eq!(dashboard.stats.total_miles, 11.0);
    assert_eq!(dashboard.stats.total_seconds, 5940);
    assert_eq!(dashboard.stats.avg_pace_seconds, Some(540.0));
    assert_eq!(dashboard.stats.avg_heart_rate, 145.0);
    assert_eq!(dashboard.rejected_records, 1);

    let weeks: Vec<(&str, f64, u64)> = dashboard
        .weekly
        .iter()
        .map(|w| (w.week.as_str(), w.totals.miles, w.totals.time))
        .collect();
    assert_eq!(weeks, vec![("2026-01-05", 5.0, 2700), ("2026-01-12", 6.0, 3240)]);
    assert_eq!(dashboard.monthly_miles.get("2026-1"), Some(&11.0));
}

#[tokio::test]
async fn http_unknown_block_is_not_found() {
    let server = shared_server().await;
    let response = Client::new()
        .get(format!("{}/api/blocks/boston/stats", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_dashboard_page_renders() {
    let server = shared_server().await;
    let response = Client::new()
        .get(format!("{}/blocks/ultra", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let html = response.text().await.unwrap();
    assert!(html.contains("Ultra 50km Training"));
    assert!(html.contains("Weekly Progression"));
    assert!(html.contains("Distance Over Time"));
}
