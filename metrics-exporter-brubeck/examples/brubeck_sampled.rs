use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use metrics_exporter_brubeck::BrubeckBuilder;
use rand::Rng as _;

fn main() {
    tracing_subscriber::fmt::init();

    let client = BrubeckBuilder::default()
        .with_prefix("demo")
        .with_host("localhost")
        .with_port(9125)
        .with_drop_hook(|reason, line| eprintln!("dropped ({reason:?}): {line}"))
        .build();
    let client = Arc::new(client);

    let mut rng = rand::rng();
    let mut last_report = Instant::now();

    // Loop over and over, pretending to do some work.
    loop {
        let start = Instant::now();
        std::thread::sleep(Duration::from_millis(rng.random_range(1..20)));
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        client.increment("loops");
        client.increment_sampled("items_processed", rng.random_range(1..100), 0.25);
        client.record_time_sampled("loop_time", elapsed_ms, 0.1);

        if last_report.elapsed() > Duration::from_secs(10) {
            tracing::info!(telemetry = ?client.telemetry(), "Client telemetry.");
            last_report = Instant::now();
        }
    }
}
