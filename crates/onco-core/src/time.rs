/// Milliseconds since the unix epoch.
pub type EpochMs = i64;

pub fn now_ms() -> EpochMs {
    use std::time::{SystemTime, UNIX_EPOCH};
    let dur = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    dur.as_millis() as EpochMs
}
