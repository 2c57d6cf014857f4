//! 残り時間の推定
//!
//! 完了件数あたりの平均処理時間 × 残件数（累積平均、平滑化なし）

use std::time::Duration;

/// 残り時間を推定
pub fn estimate_remaining(elapsed: Duration, completed: usize, total: usize) -> Duration {
    if completed == 0 {
        return Duration::ZERO;
    }
    let remaining = total.saturating_sub(completed) as u32;
    (elapsed / completed as u32) * remaining
}

/// `HH:MM:SS` 形式
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_remaining_average() {
        let eta = estimate_remaining(Duration::from_secs(30), 3, 10);
        assert_eq!(eta, Duration::from_secs(70));
    }

    #[test]
    fn test_estimate_remaining_done_or_empty() {
        assert_eq!(estimate_remaining(Duration::from_secs(30), 10, 10), Duration::ZERO);
        assert_eq!(estimate_remaining(Duration::from_secs(30), 0, 10), Duration::ZERO);
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_hms(Duration::from_secs(3725)), "01:02:05");
        assert_eq!(format_hms(Duration::from_millis(59_999)), "00:00:59");
    }
}
