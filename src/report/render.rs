//! Renders a client record into the reply text.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use super::humanize_bytes;
use crate::snapshot::ClientRecord;

/// Reply to `/start`.
pub const START_PROMPT: &str = "اکانت یا ایدی اکانت خود را بفرستید";

/// Reply when nothing matches the query, whatever the reason.
pub const NOT_FOUND: &str = "پیدا نشد";

const UNLIMITED: &str = "بی نهایت";
const NO_EXPIRY: &str = "بدون محدودیت زمانی";
const ACTIVE: &str = "فعال";
const INACTIVE: &str = "غیر فعال";

/// Interprets the first ten digits of a panel expiry value as epoch seconds.
///
/// The panel stores milliseconds; taking the leading digits also accepts
/// values already expressed in seconds.
#[must_use]
pub fn expiry_epoch_secs(expiry_time: i64) -> i64 {
    let digits = expiry_time.to_string();
    digits
        .get(..10)
        .unwrap_or(digits.as_str())
        .parse()
        .unwrap_or_default()
}

/// Seconds left until expiry, floored at zero. `None` means no expiry.
#[must_use]
pub fn remaining_secs(expiry_time: Option<i64>, now: DateTime<Utc>) -> Option<u64> {
    let expiry = expiry_time.filter(|&value| value != 0)?;
    let left = expiry_epoch_secs(expiry).saturating_sub(now.timestamp());
    Some(u64::try_from(left).unwrap_or(0))
}

/// Absolute expiry instant, only for positive timestamps.
#[must_use]
pub fn expires_at(expiry_time: Option<i64>) -> Option<DateTime<Utc>> {
    let secs = expiry_epoch_secs(expiry_time?);
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

/// Formats a remaining duration as days, hours and minutes.
#[must_use]
pub fn format_remaining(secs: u64) -> String {
    if secs == 0 {
        return "0 دقیقه".to_owned();
    }
    if secs < 60 {
        return "کمتر از یک دقیقه".to_owned();
    }

    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days} روز"));
    }
    if hours > 0 {
        parts.push(format!("{hours} ساعت"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} دقیقه"));
    }
    parts.join(" و ")
}

/// Zero renders as "0" rather than "0.00 B".
fn usage(bytes: u64) -> String {
    if bytes == 0 {
        "0".to_owned()
    } else {
        humanize_bytes(bytes)
    }
}

/// Renders the full usage report for `record` as seen at `now`.
#[must_use]
pub fn render_report(record: &ClientRecord, now: DateTime<Utc>) -> String {
    let ip_limit = record
        .ip_limit
        .map_or_else(|| UNLIMITED.to_owned(), |limit| limit.to_string());
    let quota = record
        .total_bytes
        .map_or_else(|| UNLIMITED.to_owned(), humanize_bytes);
    let status = if record.enable { ACTIVE } else { INACTIVE };
    let remaining = remaining_secs(record.expiry_time, now)
        .map_or_else(|| NO_EXPIRY.to_owned(), format_remaining);

    let mut report = format!(
        "ایمیل: {}\n\
         هش ایدی: {}\n\
         چند کاربره: {ip_limit}\n\
         حجم قابل استفاده: {quota}\n\
         حجم کلی استفاده شده: {}\n\
         مقدار اپلود: {}\n\
         مقدار دانلود: {}\n\
         وضعیت: {status}\n\
         زمان باقی مانده: {remaining}",
        record.email,
        record.uid,
        usage(record.used_bytes()),
        usage(record.up),
        usage(record.down),
    );

    if let Some(at) = expires_at(record.expiry_time) {
        let _ = write!(report, "\nتاریخ انقضا: {}", at.format("%Y-%m-%d %H:%M UTC"));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn sample_record() -> ClientRecord {
        let mut record = ClientRecord::new("u1", "a@x", 443);
        record.up = 100;
        record.down = 200;
        record
    }

    #[test]
    fn test_expiry_epoch_from_millis_and_secs() {
        assert_eq!(expiry_epoch_secs(1_700_000_000_123), 1_700_000_000);
        assert_eq!(expiry_epoch_secs(1_700_000_000), 1_700_000_000);
        assert_eq!(expiry_epoch_secs(86_400), 86_400);
    }

    #[test]
    fn test_remaining_no_expiry() {
        assert_eq!(remaining_secs(None, at(1_700_000_000)), None);
        assert_eq!(remaining_secs(Some(0), at(1_700_000_000)), None);
    }

    #[test]
    fn test_remaining_future_and_past() {
        let now = at(1_700_000_000);
        assert_eq!(remaining_secs(Some(1_700_003_600_000), now), Some(3600));
        assert_eq!(remaining_secs(Some(1_600_000_000_000), now), Some(0));
        assert_eq!(remaining_secs(Some(-86_400_000), now), Some(0));
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "0 دقیقه");
        assert_eq!(format_remaining(30), "کمتر از یک دقیقه");
        assert_eq!(format_remaining(3600), "1 ساعت");
        assert_eq!(format_remaining(2 * 86_400 + 3 * 3600 + 5 * 60), "2 روز و 3 ساعت و 5 دقیقه");
    }

    #[test]
    fn test_report_unlimited_account() {
        let report = render_report(&sample_record(), at(1_700_000_000));

        assert!(report.contains("ایمیل: a@x"));
        assert!(report.contains("هش ایدی: u1"));
        assert!(report.contains("چند کاربره: بی نهایت"));
        assert!(report.contains("حجم قابل استفاده: بی نهایت"));
        assert!(report.contains("حجم کلی استفاده شده: 300.00 B"));
        assert!(report.contains("مقدار اپلود: 100.00 B"));
        assert!(report.contains("مقدار دانلود: 200.00 B"));
        assert!(report.contains("وضعیت: فعال"));
        assert!(report.contains("زمان باقی مانده: بدون محدودیت زمانی"));
        assert!(!report.contains("تاریخ انقضا"));
    }

    #[test]
    fn test_report_limited_expired_account() {
        let mut record = sample_record();
        record.total_bytes = Some(10 * 1024 * 1024 * 1024);
        record.ip_limit = Some(2);
        record.up = 0;
        record.down = 0;
        record.enable = false;
        record.expiry_time = Some(1_600_000_000_000);

        let report = render_report(&record, at(1_700_000_000));

        assert!(report.contains("چند کاربره: 2"));
        assert!(report.contains("حجم قابل استفاده: 10.00 GiB"));
        assert!(report.contains("حجم کلی استفاده شده: 0\n"));
        assert!(report.contains("وضعیت: غیر فعال"));
        assert!(report.contains("زمان باقی مانده: 0 دقیقه"));
        assert!(report.contains("تاریخ انقضا: 2020-09-13 12:26 UTC"));
    }
}
