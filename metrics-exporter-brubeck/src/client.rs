use std::{fmt, sync::Arc};

use tracing::trace;

use crate::{
    builder::BrubeckBuilder,
    forwarder::Transport,
    sampling::{self, RandomSource},
    telemetry::{DropReason, Telemetry, TelemetrySnapshot},
    writer::{format_stat, MetricValue},
};

/// A client for sending counters and timers to a brubeck server.
///
/// Every emission is formatted into a single line and written to the destination as its own datagram. Emission never
/// fails and never blocks: if the client is disabled, it does nothing at all, and if the line cannot be delivered, it is
/// dropped and counted in the client's [telemetry](StatsdClient::telemetry).
///
/// The client holds no mutable state besides its telemetry counters, so it can be freely shared between threads, usually
/// behind an `Arc`.
pub struct StatsdClient {
    prefix: String,
    disabled: bool,
    destination: Option<Box<dyn Transport>>,
    random: Arc<dyn RandomSource>,
    telemetry: Telemetry,
}

impl StatsdClient {
    /// Creates a client that sends to `host` on the default port, under the given application prefix.
    ///
    /// When `disabled` is `true`, no socket is opened and every emission is a no-op, which is useful for test and
    /// development environments. If the connection cannot be set up within the connect timeout, the client is still
    /// created but drops everything it emits.
    ///
    /// This is intended to be called once per application.
    pub fn new<P, H>(prefix: P, host: H, disabled: bool) -> Self
    where
        P: Into<String>,
        H: Into<String>,
    {
        BrubeckBuilder::default().with_prefix(prefix).with_host(host).with_disabled(disabled).build()
    }

    pub(crate) fn from_parts(
        prefix: String,
        disabled: bool,
        destination: Option<Box<dyn Transport>>,
        random: Arc<dyn RandomSource>,
        telemetry: Telemetry,
    ) -> Self {
        StatsdClient { prefix, disabled, destination, random, telemetry }
    }

    /// Returns the application prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns `true` if the client is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns `true` if the client has a destination to write to.
    pub fn is_connected(&self) -> bool {
        self.destination.is_some()
    }

    /// Returns a snapshot of the client's telemetry.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    /// Increments a counter by one.
    pub fn increment(&self, stat: &str) {
        self.increment_by(stat, 1);
    }

    /// Decrements a counter by one.
    pub fn decrement(&self, stat: &str) {
        self.increment_by(stat, -1);
    }

    /// Increments a counter by `count`.
    ///
    /// Negative counts decrement the counter.
    pub fn increment_by(&self, stat: &str, count: i64) {
        self.send(stat, MetricValue::Count(count));
    }

    /// Decrements a counter by `count`.
    pub fn decrement_by(&self, stat: &str, count: i64) {
        self.increment_by(stat, count.saturating_neg());
    }

    /// Records a timing, in milliseconds.
    pub fn record_time(&self, stat: &str, millis: f64) {
        self.send(stat, MetricValue::Millis(millis));
    }

    /// Increments a counter by `count`, sampled at `sample_rate`.
    ///
    /// With probability `sample_rate`, a count rescaled by the sample rate is sent, so that the server-side sum matches
    /// the unsampled sum on average. Otherwise, nothing is sent.
    ///
    /// A `sample_rate` of exactly `0.0` still fires on a random draw of exactly `0.0`, in which case `count` is sent
    /// unscaled.
    pub fn increment_sampled(&self, stat: &str, count: i64, sample_rate: f64) {
        if let Some(count) = self.sample_count(count, sample_rate) {
            self.increment_by(stat, count);
        }
    }

    /// Decrements a counter by `count`, sampled at `sample_rate`.
    ///
    /// See [`increment_sampled`](StatsdClient::increment_sampled) for how sampling affects the value sent.
    pub fn decrement_sampled(&self, stat: &str, count: i64, sample_rate: f64) {
        if let Some(count) = self.sample_count(count, sample_rate) {
            self.decrement_by(stat, count);
        }
    }

    /// Records a timing, in milliseconds, sampled at `sample_rate`.
    ///
    /// Timings are point observations rather than additive quantities, so when sent they are sent unmodified.
    pub fn record_time_sampled(&self, stat: &str, millis: f64, sample_rate: f64) {
        if self.disabled {
            return;
        }

        if self.sampled(sample_rate) {
            self.record_time(stat, millis);
        } else {
            self.telemetry.track_sample_skipped();
        }
    }

    /// Returns `true` if a metric observed at `sample_rate` should be sent.
    ///
    /// Each call makes an independent draw from the client's random source.
    pub fn sampled(&self, sample_rate: f64) -> bool {
        sampling::sampled(self.random.as_ref(), sample_rate)
    }

    /// Rescales `count` by `sample_rate`, rounding stochastically so that the expected value is `count / sample_rate`.
    pub fn rescale_count(&self, count: i64, sample_rate: f64) -> i64 {
        sampling::rescale_count(self.random.as_ref(), count, sample_rate)
    }

    /// Formats a counter line for `stat`, exactly as it would be sent.
    pub fn format_counter(&self, stat: &str, count: i64) -> String {
        format_stat(&self.prefix, stat, MetricValue::Count(count))
    }

    /// Formats a timer line for `stat`, exactly as it would be sent.
    pub fn format_timer(&self, stat: &str, millis: f64) -> String {
        format_stat(&self.prefix, stat, MetricValue::Millis(millis))
    }

    fn sample_count(&self, count: i64, sample_rate: f64) -> Option<i64> {
        if self.disabled {
            return None;
        }

        if self.sampled(sample_rate) {
            Some(self.rescale_count(count, sample_rate))
        } else {
            self.telemetry.track_sample_skipped();
            None
        }
    }

    fn send(&self, stat: &str, value: MetricValue) {
        if self.disabled {
            return;
        }

        let line = format_stat(&self.prefix, stat, value);
        match &self.destination {
            Some(destination) => match destination.send(line.as_bytes()) {
                Ok(_) => self.telemetry.track_send_succeeded(line.len()),
                Err(e) => {
                    trace!(error = %e, line = %line, "Failed to send metric line.");
                    self.telemetry.track_send_failed(DropReason::WriteFailed, &line);
                }
            },
            None => {
                trace!(line = %line, "No destination for metric line.");
                self.telemetry.track_send_failed(DropReason::NoDestination, &line);
            }
        }
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsdClient")
            .field("prefix", &self.prefix)
            .field("disabled", &self.disabled)
            .field("connected", &self.destination.is_some())
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}
