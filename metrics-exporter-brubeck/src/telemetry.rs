use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering::Relaxed},
        Arc,
    },
};

/// Why a metric line was not delivered to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The client has no destination, because connection setup failed.
    NoDestination,

    /// The transport rejected the write.
    WriteFailed,
}

/// Callback invoked for every dropped metric line.
///
/// The hook receives the reason for the drop and the fully formatted line. It runs inline on the emitting thread, so it
/// should be cheap.
pub type DropHook = Arc<dyn Fn(DropReason, &str) + Send + Sync>;

/// Client telemetry.
///
/// `Telemetry` tracks how many lines were delivered to the transport or dropped, so that observability tooling can
/// measure drop rates without emission ever becoming fallible.
///
/// The counters are plain atomics rather than `metrics` handles. They stay readable through
/// [`StatsdClient::telemetry`](crate::StatsdClient::telemetry) when no global recorder is installed, and when the client
/// itself backs the recorder, tracking a drop never feeds another line back into the client.
#[derive(Default)]
pub(crate) struct Telemetry {
    lines_sent: AtomicU64,
    bytes_sent: AtomicU64,
    lines_dropped_writer: AtomicU64,
    lines_dropped_no_destination: AtomicU64,
    bytes_dropped: AtomicU64,
    samples_skipped: AtomicU64,
    drop_hook: Option<DropHook>,
}

impl Telemetry {
    /// Creates a `Telemetry` instance, with an optional hook to call on every dropped line.
    pub fn new(drop_hook: Option<DropHook>) -> Self {
        Self { drop_hook, ..Self::default() }
    }

    /// Tracks a line successfully handed to the transport.
    pub fn track_send_succeeded(&self, bytes_len: usize) {
        self.lines_sent.fetch_add(1, Relaxed);
        self.bytes_sent.fetch_add(bytes_len as u64, Relaxed);
    }

    /// Tracks a dropped line.
    pub fn track_send_failed(&self, reason: DropReason, line: &str) {
        match reason {
            DropReason::NoDestination => self.lines_dropped_no_destination.fetch_add(1, Relaxed),
            DropReason::WriteFailed => self.lines_dropped_writer.fetch_add(1, Relaxed),
        };
        self.bytes_dropped.fetch_add(line.len() as u64, Relaxed);

        if let Some(hook) = &self.drop_hook {
            hook(reason, line);
        }
    }

    /// Tracks a sampled metric that was not selected for emission.
    pub fn track_sample_skipped(&self) {
        self.samples_skipped.fetch_add(1, Relaxed);
    }

    /// Takes a point-in-time copy of the counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            lines_sent: self.lines_sent.load(Relaxed),
            bytes_sent: self.bytes_sent.load(Relaxed),
            lines_dropped_writer: self.lines_dropped_writer.load(Relaxed),
            lines_dropped_no_destination: self.lines_dropped_no_destination.load(Relaxed),
            bytes_dropped: self.bytes_dropped.load(Relaxed),
            samples_skipped: self.samples_skipped.load(Relaxed),
        }
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("counters", &self.snapshot())
            .field("drop_hook", &self.drop_hook.is_some())
            .finish()
    }
}

/// A point-in-time copy of client telemetry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Lines handed to the transport.
    pub lines_sent: u64,

    /// Bytes handed to the transport.
    pub bytes_sent: u64,

    /// Lines the transport failed to write.
    pub lines_dropped_writer: u64,

    /// Lines dropped because the client has no destination.
    pub lines_dropped_no_destination: u64,

    /// Bytes of all dropped lines.
    pub bytes_dropped: u64,

    /// Sampled metrics that were not selected for emission.
    pub samples_skipped: u64,
}

impl TelemetrySnapshot {
    /// Returns the total number of dropped lines.
    pub const fn lines_dropped(&self) -> u64 {
        self.lines_dropped_writer + self.lines_dropped_no_destination
    }
}
