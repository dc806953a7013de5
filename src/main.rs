mod menu;

use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use common::config::{load_config, DashboardConfig, Strategy};
use common::metrics::TickResult;
use common::source::{CachedMarketData, FetchKey, MarketDataSource, SimulatedMarketData};
use common::RenderFrame;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "configs/dashboard_default.toml";

fn main() {
    let config = load_demo_config();
    init_logging(&config);

    println!("===========================================");
    println!("Welcome to the Real-Time Feed Dashboard");
    println!("===========================================");

    loop {
        menu::show_menu();

        match menu::get_user_choice() {
            Ok(1) => run_threaded_demo(Strategy::Polling),
            Ok(2) => run_threaded_demo(Strategy::Timer),
            Ok(3) => run_async_demo(),
            Ok(4) => run_cached_fetch_demo(),
            Ok(5) => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please select 1-5."),
        }
    }
}

fn init_logging(config: &DashboardConfig) {
    let default_level = if config.enable_logging { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_demo_config() -> DashboardConfig {
    match load_config(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            println!("Could not load {CONFIG_PATH} ({e}); using built-in defaults");
            DashboardConfig::default()
        }
    }
}

fn describe(config: &DashboardConfig) {
    println!(
        "Configuration: {} strategy, {}ms tick, {:.1}s refresh interval, capacity {}, {} seconds duration",
        config.strategy,
        config.tick_period_ms,
        config.refresh_interval_secs,
        config.buffer_capacity,
        config.duration_secs
    );
}

fn run_threaded_demo(strategy: Strategy) {
    println!("\n=== Running Threaded Implementation Demo ===");

    let mut config = load_demo_config();
    config.strategy = strategy;
    describe(&config);

    let (frame_tx, frame_rx) = mpsc::sync_channel(32);
    // stand-in for the external chart renderer
    let renderer = thread::spawn(move || render_frames(frame_rx));

    let recorder = threaded_impl::run_session(config, frame_tx);

    let frames = renderer.join().unwrap_or(0);
    display_results(&recorder.get_results(), frames);
    save_results(&recorder);

    menu::wait_for_enter();
}

fn run_async_demo() {
    println!("\n=== Running Async Implementation Demo ===");

    let config = load_demo_config();
    describe(&config);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            println!("Failed to start tokio runtime: {e}");
            return;
        }
    };

    let (recorder, frames) = rt.block_on(async {
        let (frame_tx, mut frame_rx) = tokio::sync::mpsc::channel::<RenderFrame>(32);
        let consumer = tokio::spawn(async move {
            let mut count = 0usize;
            while let Some(frame) = frame_rx.recv().await {
                print_frame(&frame);
                count += 1;
            }
            count
        });

        let recorder = async_impl::run_session(config, frame_tx).await;
        let frames = consumer.await.unwrap_or(0);
        (recorder, frames)
    });

    display_results(&recorder.get_results(), frames);
    save_results(&recorder);

    menu::wait_for_enter();
}

fn run_cached_fetch_demo() {
    println!("\n=== Running Cached Market Fetch Demo ===");

    let config = load_demo_config();
    println!(
        "Fetch TTL: {:.0}s, repeated fetches inside the window reuse the cached series",
        config.fetch_ttl_secs
    );

    let market = CachedMarketData::new(SimulatedMarketData::new(120), config.fetch_ttl());
    let key = FetchKey {
        symbol: "ACME".to_string(),
        period: "1d".to_string(),
        interval: "1m".to_string(),
    };

    for attempt in 1..=3 {
        let started = Instant::now();
        match market.closes(&key) {
            Ok(closes) => {
                let last = closes.last().map(|s| s.value).unwrap_or(0.0);
                println!(
                    "Fetch #{attempt}: {} closes for {} (last {:.2}) in {:?}",
                    closes.len(),
                    key.symbol,
                    last,
                    started.elapsed()
                );
            }
            Err(e) => println!("Fetch #{attempt} failed: {e}"),
        }
    }

    // an expired window would recompute; within it the source ran once
    let demo_source = SimulatedMarketData::new(5);
    let direct = demo_source.fetch_closes(&key).map(|c| c.len()).unwrap_or(0);
    println!("Direct (uncached) fetch returns {direct} closes and always hits the source.");

    menu::wait_for_enter();
}

fn render_frames(rx: mpsc::Receiver<RenderFrame>) -> usize {
    let mut count = 0usize;
    while let Ok(frame) = rx.recv() {
        print_frame(&frame);
        count += 1;
    }
    count
}

fn print_frame(frame: &RenderFrame) {
    let last = frame.last_value().unwrap_or(0.0);
    let at = frame
        .series
        .last()
        .map(|s| s.time_label())
        .unwrap_or_default();
    println!(
        "[render] tick #{:<4} samples: {:<3} last: {:.2} @ {} PnL: ${}",
        frame.tick_id,
        frame.series.len(),
        last,
        at,
        frame.pnl
    );
}

fn display_results(results: &[TickResult], frames: usize) {
    if results.is_empty() {
        println!("No results to display.");
        return;
    }

    let total_ticks = results.len();
    let triggered = results.iter().filter(|r| r.triggered).count();
    let final_fill = results.last().map(|r| r.buffer_len).unwrap_or(0);

    println!("\n=== Session Results ===");
    println!("Total ticks: {total_ticks}");
    println!(
        "Refresh triggers: {} ({:.1}% of ticks)",
        triggered,
        triggered as f64 / total_ticks as f64 * 100.0
    );
    println!("Frames rendered: {frames}");
    println!("Final buffer fill: {final_fill} samples");
}

fn save_results(recorder: &common::TickRecorder) {
    match recorder.save_to_csv("tick_metrics.csv") {
        Ok(()) => println!("Saved {} tick records to tick_metrics.csv", recorder.len()),
        Err(e) => println!("Could not save tick metrics: {e}"),
    }
}
