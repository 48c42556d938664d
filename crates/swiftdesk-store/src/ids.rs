//! Chronologically sortable child keys for appended entries.

use parking_lot::{Mutex, const_mutex};
use uuid::Uuid;

/// Last issued millisecond and the sequence within it.
static LAST_ISSUED: Mutex<(i64, u32)> = const_mutex((0, 0));

/// Generate a unique key that sorts after every key previously generated in
/// this process: zero-padded epoch millis, a per-millisecond sequence, and a
/// random suffix to keep keys from different processes apart.
pub fn next_push_id() -> String {
    let now = chrono::Utc::now().timestamp_millis();
    let (millis, seq) = {
        let mut last = LAST_ISSUED.lock();
        if now > last.0 {
            *last = (now, 0);
        } else {
            last.1 += 1;
        }
        *last
    };
    let suffix = Uuid::new_v4().simple().to_string();
    format_push_id(millis, seq, &suffix[..8])
}

/// Both numeric fields are fixed width so byte order matches issue order.
fn format_push_id(millis: i64, seq: u32, suffix: &str) -> String {
    format!("{millis:013}-{seq:08x}-{suffix}")
}
