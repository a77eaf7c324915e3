//! Retention arithmetic and history labels.
//!
//! History rows carry a millisecond timestamp. A row is visible while it is strictly newer
//! than `now - RETENTION_MS`; cleanup removes everything at or before that cutoff.

use chrono::DateTime;

pub const RETENTION_DAYS: i64 = 2;
pub const RETENTION_MS: i64 = RETENTION_DAYS * 24 * 60 * 60 * 1000;

/// Number of rows returned when the caller does not ask for a specific limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Oldest timestamp (exclusive) still inside the retention window at `now_ms`.
pub fn retention_cutoff(now_ms: i64) -> i64 {
    now_ms.saturating_sub(RETENTION_MS)
}

pub fn is_within_retention(created_at_ms: i64, now_ms: i64) -> bool {
    created_at_ms > retention_cutoff(now_ms)
}

/// Label stored in history for a scientific call: `op(value)` or `op(value, second)`.
pub fn scientific_expression(operation: &str, value: f64, second_value: Option<f64>) -> String {
    match second_value {
        Some(second) => format!("{operation}({value}, {second})"),
        None => format!("{operation}({value})"),
    }
}

/// Renders a millisecond timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000_000;

    #[test]
    fn test_retention_window_is_two_days() {
        assert_eq!(RETENTION_MS, 172_800_000);
        assert_eq!(retention_cutoff(NOW), NOW - 172_800_000);
    }

    #[test]
    fn test_cutoff_boundary_is_outside_window() {
        let cutoff = retention_cutoff(NOW);
        assert!(!is_within_retention(cutoff, NOW));
        assert!(is_within_retention(cutoff + 1, NOW));
        assert!(!is_within_retention(cutoff - 1, NOW));
    }

    #[test]
    fn test_recent_record_is_within_window() {
        assert!(is_within_retention(NOW, NOW));
        assert!(is_within_retention(NOW - 60_000, NOW));
    }

    #[test]
    fn test_cutoff_does_not_underflow() {
        assert_eq!(retention_cutoff(i64::MIN), i64::MIN);
    }

    #[test]
    fn test_scientific_expression_single_operand() {
        assert_eq!(scientific_expression("sqrt", 16.0, None), "sqrt(16)");
        assert_eq!(scientific_expression("sin", 0.5, None), "sin(0.5)");
    }

    #[test]
    fn test_scientific_expression_two_operands() {
        assert_eq!(scientific_expression("pow", 2.0, Some(10.0)), "pow(2, 10)");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(86_400_000 + 1_500), "1970-01-02 00:00:01 UTC");
    }
}
