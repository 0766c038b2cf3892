use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use metrics_exporter_brubeck::BrubeckBuilder;

fn main() {
    tracing_subscriber::fmt::init();

    BrubeckBuilder::default()
        .with_prefix("demo")
        .with_host("localhost")
        .with_port(9125)
        .install()
        .expect("failed to install brubeck recorder");

    let loops = counter!("tcp_server_loops");
    let loop_time = histogram!("tcp_server_loop_time");

    loop {
        let start = Instant::now();
        std::thread::sleep(Duration::from_millis(5));

        loops.increment(1);
        loop_time.record(start.elapsed().as_secs_f64() * 1000.0);
    }
}
