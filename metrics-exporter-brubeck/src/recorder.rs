use std::sync::Arc;

use metrics::{
    Counter, CounterFn, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
    SharedString, Unit,
};

use crate::client::StatsdClient;

/// A recorder that sends metrics to a brubeck server.
///
/// Counters are sent as counter deltas, and histograms are sent as timers, with recorded values interpreted as
/// milliseconds. Gauges have no representation and are discarded. Labels are not sent, only the metric name is used as
/// the stat.
pub struct BrubeckRecorder {
    client: Arc<StatsdClient>,
}

impl BrubeckRecorder {
    /// Creates a recorder that sends through the given client.
    pub fn new(client: Arc<StatsdClient>) -> Self {
        BrubeckRecorder { client }
    }

    /// Returns a reference to the underlying client.
    pub fn client(&self) -> &Arc<StatsdClient> {
        &self.client
    }
}

struct CounterHandle {
    client: Arc<StatsdClient>,
    stat: String,
}

impl CounterFn for CounterHandle {
    fn increment(&self, value: u64) {
        self.client.increment_by(&self.stat, i64::try_from(value).unwrap_or(i64::MAX));
    }

    // Counters are sent as deltas, so there is no way to express an absolute value.
    fn absolute(&self, _: u64) {}
}

struct TimerHandle {
    client: Arc<StatsdClient>,
    stat: String,
}

impl HistogramFn for TimerHandle {
    fn record(&self, value: f64) {
        self.client.record_time(&self.stat, value);
    }
}

impl Recorder for BrubeckRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        if self.client.is_disabled() {
            return Counter::noop();
        }

        Counter::from_arc(Arc::new(CounterHandle {
            client: Arc::clone(&self.client),
            stat: key.name().to_string(),
        }))
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
        if self.client.is_disabled() {
            return Histogram::noop();
        }

        Histogram::from_arc(Arc::new(TimerHandle {
            client: Arc::clone(&self.client),
            stat: key.name().to_string(),
        }))
    }
}
