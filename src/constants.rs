/// Application-wide constants
/// All magic numbers and constant values should be defined here

/// How long an item stays visible after creation (24 hours)
pub const RETENTION_HOURS: i64 = 24;

/// Sweep task interval in seconds (1 hour)
pub const SWEEP_INTERVAL_SECS: u64 = 3600;

/// Maximum request body size in bytes (64 KB is plenty for clipboard text)
pub const MAX_BODY_SIZE: usize = 64 * 1024;
