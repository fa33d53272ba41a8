/// All primary keys are store-assigned BIGSERIAL-style integers.
///
/// `0` is never assigned and is treated as "unassigned" wherever a client
/// may send an id.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
