use chrono::{DateTime, SecondsFormat, Utc};

/// RFC3339 毫秒精度，UTC 以 `Z` 结尾
pub fn to_iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_millis_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 5).unwrap();
        assert_eq!(to_iso_millis(at), "2024-03-01T08:30:05.000Z");
    }
}
