use std::{net::UdpSocket, time::Duration};

use metrics::{Key, Recorder};
use metrics_exporter_brubeck::{BrubeckBuilder, StatsdClient, TIMER_NAMESPACE};

static METADATA: metrics::Metadata =
    metrics::Metadata::new(module_path!(), metrics::Level::INFO, Some(module_path!()));

fn receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap_or_else(|e| panic!("failed to bind receiver: {e:?}"));
    socket.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

fn recv_line(socket: &UdpSocket) -> String {
    let mut buf = [0u8; 512];
    let len = socket.recv(&mut buf).unwrap_or_else(|e| panic!("no datagram received: {e:?}"));
    String::from_utf8(buf[..len].to_vec()).unwrap()
}

fn client_for(port: u16) -> StatsdClient {
    BrubeckBuilder::default().with_prefix("appname").with_host("127.0.0.1").with_port(port).build()
}

#[test]
fn one_datagram_per_metric() {
    let (socket, port) = receiver();
    let client = client_for(port);

    client.increment("hits");
    client.decrement_by("hits", 4);
    client.record_time("qps", 20.004);
    client.increment_sampled("always", 5, 1.0);
    client.record_time_sampled("always", 1.5, 1.0);

    assert_eq!(recv_line(&socket), "brubeck.stats_d.appname.hits:1|c");
    assert_eq!(recv_line(&socket), "brubeck.stats_d.appname.hits:-4|c");
    assert_eq!(recv_line(&socket), "brubeck.stats_d.timers.appname.qps:20.00|ms");
    assert_eq!(recv_line(&socket), "brubeck.stats_d.appname.always:5|c");
    assert_eq!(recv_line(&socket), "brubeck.stats_d.timers.appname.always:1.50|ms");

    let telemetry = client.telemetry();
    assert_eq!(telemetry.lines_sent, 5);
    assert_eq!(telemetry.lines_dropped(), 0);
}

#[test]
fn sampled_counters_preserve_expected_total() {
    let (socket, port) = receiver();
    let client = client_for(port);

    let attempts = 2000;
    let sample_rate = 0.5;
    let mut sent = 0u64;
    let mut total = 0i64;
    for _ in 0..attempts {
        client.increment_sampled("sampled", 10, sample_rate);

        // Drain as we go so the receive buffer never overflows.
        if client.telemetry().lines_sent > sent {
            sent += 1;

            let line = recv_line(&socket);
            let value = line
                .strip_prefix("brubeck.stats_d.appname.sampled:")
                .and_then(|rest| rest.strip_suffix("|c"))
                .unwrap_or_else(|| panic!("unexpected line: {line}"));
            assert_eq!(value, "20");
            total += value.parse::<i64>().unwrap();
        }
    }

    // Roughly half the calls should have fired; allow a wide margin since this uses the default random source.
    assert!(sent > 800 && sent < 1200, "unexpected number of sampled sends: {sent}");
    assert_eq!(total, sent as i64 * 20);
    assert_eq!(client.telemetry().samples_skipped, attempts - sent);
}

#[test]
fn disabled_client_sends_nothing() {
    let (socket, port) = receiver();
    socket.set_read_timeout(Some(Duration::from_millis(200))).unwrap();

    let client = BrubeckBuilder::default().with_prefix("appname").with_port(port).with_disabled(true).build();
    client.increment("hits");
    client.increment_sampled("hits", 1, 1.0);
    client.record_time("qps", 1.0);

    let mut buf = [0u8; 64];
    assert!(socket.recv(&mut buf).is_err());
    assert_eq!(client.telemetry().lines_sent, 0);
}

#[test]
fn recorder_sends_histograms_as_timers() {
    let (socket, port) = receiver();
    let recorder = BrubeckBuilder::default()
        .with_prefix("appname")
        .with_host("127.0.0.1")
        .with_port(port)
        .build_recorder();

    let histogram = recorder.register_histogram(&Key::from_name("render"), &METADATA);
    histogram.record(16.0);

    let line = recv_line(&socket);
    assert!(line.starts_with(TIMER_NAMESPACE));
    assert_eq!(line, "brubeck.stats_d.timers.appname.render:16.00|ms");
}
