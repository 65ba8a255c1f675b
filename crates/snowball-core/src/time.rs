/// Current Unix time in microseconds, truncated to whole seconds.
///
/// The analytics table stores `TIMESTAMP` columns as epoch microseconds; rows
/// from one tick share a value.
pub fn timestamp_micros() -> i64 {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(dur.as_secs())
        .unwrap_or(i64::MAX / 1_000_000)
        .saturating_mul(1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_seconds_in_micros() {
        let ts = timestamp_micros();
        assert!(ts > 1_600_000_000_000_000);
        assert_eq!(ts % 1_000_000, 0);
    }
}
