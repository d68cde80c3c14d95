use chrono::Utc;

/// Current wall-clock time in whole seconds.
pub fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}
