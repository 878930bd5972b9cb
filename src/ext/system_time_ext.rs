use std::time::SystemTime;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// `Sun Oct 18 12:00:00 2026`, the layout of C's `ctime` without its newline.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
);

pub trait SystemTimeExt {
    fn to_timestamp(&self) -> String;
}

impl SystemTimeExt for SystemTime {
    /// Formats in the local timezone, falling back to UTC when the offset
    /// cannot be determined.
    fn to_timestamp(&self) -> String {
        let utc = OffsetDateTime::from(*self);
        let local = UtcOffset::current_local_offset()
            .map(|offset| utc.to_offset(offset))
            .unwrap_or(utc);
        format_timestamp(local)
    }
}

/// Creation timestamp for nodes made right now.
pub fn current_timestamp() -> String {
    SystemTime::now().to_timestamp()
}

fn format_timestamp(datetime: OffsetDateTime) -> String {
    datetime
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| datetime.to_string())
}
