//! `HH:MM:SS` formatting shared by the aggregate timer and backend playtime.

/// Formats whole seconds as zero-padded `HH:MM:SS`.
///
/// There is no day rollover: past 99 hours the hour field just grows.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parses the backend's `HH:MM:SS` strings back into seconds.
pub fn parse_hms(value: &str) -> Option<u64> {
    let mut parts = value.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60)?
        .checked_add(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero() {
        assert_eq!(format_hms(0), "00:00:00");
    }

    #[test]
    fn formats_mixed_fields() {
        assert_eq!(format_hms(15), "00:00:15");
        assert_eq!(format_hms(3_661), "01:01:01");
    }

    #[test]
    fn hours_grow_past_two_digits() {
        assert_eq!(format_hms(100 * 3600 + 59), "100:00:59");
    }

    #[test]
    fn parses_backend_values() {
        assert_eq!(parse_hms("00:00:00"), Some(0));
        assert_eq!(parse_hms("02:30:05"), Some(9_005));
        assert_eq!(parse_hms("123:00:00"), Some(442_800));
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(parse_hms(""), None);
        assert_eq!(parse_hms("1:2"), None);
        assert_eq!(parse_hms("00:61:00"), None);
        assert_eq!(parse_hms("00:00:00:00"), None);
        assert_eq!(parse_hms("aa:bb:cc"), None);
    }
}
