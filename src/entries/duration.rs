use time::{Duration, OffsetDateTime};

/// Elapsed time as `<H>h<M>m<S>s`: hours unbounded, no zero padding,
/// sub-second remainder truncated.
pub fn format_duration(d: Duration) -> String {
    let sign = if d.is_negative() { "-" } else { "" };
    let total = d.whole_seconds().unsigned_abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{sign}{hours}h{minutes}m{seconds}s")
}

pub fn pretty_duration(start: OffsetDateTime, end: OffsetDateTime) -> String {
    format_duration(end - start)
}
