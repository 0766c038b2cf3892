use std::fmt::Write as _;

/// Namespace root for counter metrics.
pub const COUNTER_NAMESPACE: &str = "brubeck.stats_d";

/// Namespace root for timer metrics.
pub const TIMER_NAMESPACE: &str = "brubeck.stats_d.timers";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MetricType {
    Counter,
    Timer,
}

impl MetricType {
    const fn namespace(self) -> &'static str {
        match self {
            MetricType::Counter => COUNTER_NAMESPACE,
            MetricType::Timer => TIMER_NAMESPACE,
        }
    }

    const fn unit(self) -> &'static str {
        match self {
            MetricType::Counter => "|c",
            MetricType::Timer => "|ms",
        }
    }
}

/// A metric value, tagged with how it should be rendered on the wire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum MetricValue {
    /// A counter delta, rendered as a bare signed integer.
    Count(i64),

    /// A timer magnitude in milliseconds, rendered with exactly two fractional digits.
    Millis(f64),
}

impl MetricValue {
    const fn metric_type(self) -> MetricType {
        match self {
            MetricValue::Count(_) => MetricType::Counter,
            MetricValue::Millis(_) => MetricType::Timer,
        }
    }
}

/// Formats a single stat line.
///
/// Lines take the form of `<namespace>.<prefix>.<stat>:<value>|<unit>`, with no trailing newline, as each line is sent
/// in its own datagram. Neither `prefix` nor `stat` are escaped, so names containing `.`, `:` or `|` will produce lines
/// the server cannot parse as intended.
pub(crate) fn format_stat(prefix: &str, stat: &str, value: MetricValue) -> String {
    let metric_type = value.metric_type();
    let namespace = metric_type.namespace();
    let unit = metric_type.unit();

    let mut line = String::with_capacity(namespace.len() + prefix.len() + stat.len() + 24);
    line.push_str(namespace);
    line.push('.');
    line.push_str(prefix);
    line.push('.');
    line.push_str(stat);
    line.push(':');

    match value {
        MetricValue::Count(count) => {
            let mut int_writer = itoa::Buffer::new();
            line.push_str(int_writer.format(count));
        }
        MetricValue::Millis(millis) => {
            // Writing into a `String` cannot fail.
            let _ = write!(line, "{millis:.2}");
        }
    }

    line.push_str(unit);
    line
}
