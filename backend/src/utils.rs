use crate::services::schedule_service::SortOrder;

/// Parse ISO8601 date string to Unix timestamp for sorting
pub fn parse_iso8601_to_timestamp(date_str: &str) -> i64 {
    if date_str.is_empty() {
        return 0;
    }

    use chrono::{DateTime, Utc};
    if let Ok(dt) = date_str.parse::<DateTime<Utc>>() {
        return dt.timestamp();
    }

    0
}

pub fn compare_with_order_int(a: i64, b: i64, order: &SortOrder) -> std::cmp::Ordering {
    match order {
        SortOrder::Asc => a.cmp(&b),
        SortOrder::Desc => b.cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso8601_to_timestamp() {
        assert_eq!(parse_iso8601_to_timestamp("1970-01-01T00:00:00Z"), 0);
        assert_eq!(parse_iso8601_to_timestamp("2025-01-01T00:00:00Z"), 1735689600);
        assert_eq!(parse_iso8601_to_timestamp(""), 0);
        assert_eq!(parse_iso8601_to_timestamp("not a date"), 0);
    }

    #[test]
    fn test_compare_with_order() {
        use std::cmp::Ordering;
        assert_eq!(compare_with_order_int(1, 2, &SortOrder::Asc), Ordering::Less);
        assert_eq!(compare_with_order_int(1, 2, &SortOrder::Desc), Ordering::Greater);
        assert_eq!(compare_with_order_int(3, 3, &SortOrder::Asc), Ordering::Equal);
    }
}
