//! A client for sending counters and timers to a [brubeck][brubeck] statsd server, with client-side sampling.
//!
//! [brubeck]: https://github.com/github/brubeck
//!
//! # Usage
//!
//! Create a client once, early in the life of the application, and share it:
//!
//! ```no_run
//! # use metrics_exporter_brubeck::StatsdClient;
//! // Sends to `statsd.example.com:8125`. Passing `true` instead disables the client entirely, which is useful in
//! // test and development environments.
//! let client = StatsdClient::new("checkout", "statsd.example.com", false);
//!
//! client.increment("orders.placed");
//! client.record_time("orders.latency", 12.5);
//!
//! // Only ~10% of these calls send anything, but the server-side sum still averages out to the true count.
//! client.increment_sampled("orders.items", 3, 0.1);
//! ```
//!
//! The [`BrubeckBuilder`] allows configuring everything else, such as the port, the connect timeout, or the random
//! source used for sampling:
//!
//! ```no_run
//! # use std::time::Duration;
//! # use metrics_exporter_brubeck::BrubeckBuilder;
//! let client = BrubeckBuilder::default()
//!     .with_prefix("checkout")
//!     .with_host("statsd.example.com")
//!     .with_connect_timeout(Duration::from_secs(1))
//!     .build();
//! ```
//!
//! The client can also back the [`metrics`] facade, sending counters as counters and histograms as timers:
//!
//! ```no_run
//! # use metrics_exporter_brubeck::BrubeckBuilder;
//! BrubeckBuilder::default()
//!     .with_prefix("checkout")
//!     .install()
//!     .expect("failed to install recorder");
//!
//! metrics::counter!("orders.placed").increment(1);
//! metrics::histogram!("orders.latency").record(12.5);
//! ```
//!
//! # Wire format
//!
//! Each metric is sent in its own UDP datagram, as a single line with no trailing newline:
//!
//! - counters: `brubeck.stats_d.<prefix>.<stat>:<count>|c`
//! - timers: `brubeck.stats_d.timers.<prefix>.<stat>:<milliseconds>|ms`, with exactly two fractional digits
//!
//! Stat names are not escaped.
//!
//! # Sampling
//!
//! Sampled counters are sent with probability equal to the sample rate, and the count sent is scaled up by the inverse
//! of the sample rate. As this is rarely a whole number, the client picks between the rounded down and rounded up
//! values with probabilities that keep the expected value exact. Sampled timers are sent unmodified.
//!
//! # Failure handling
//!
//! Sending metrics never fails and never blocks the caller. Connection setup is bounded by a timeout, and failing to
//! connect leaves the client unable to send. Dropped lines are counted in [`StatsdClient::telemetry`] and can be
//! observed through [`BrubeckBuilder::with_drop_hook`].

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

mod builder;
pub use self::builder::{BrubeckBuilder, BuildError};

mod client;
pub use self::client::StatsdClient;

mod forwarder;
pub use self::forwarder::{Transport, UdpTransport};

mod recorder;
pub use self::recorder::BrubeckRecorder;

mod sampling;
pub use self::sampling::{RandomSource, ThreadLocalRandom};

mod telemetry;
pub use self::telemetry::{DropHook, DropReason, TelemetrySnapshot};

mod writer;
pub use self::writer::{COUNTER_NAMESPACE, TIMER_NAMESPACE};
