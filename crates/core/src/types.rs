/// Primary keys of users, categories, threads, posts and applications
/// (PostgreSQL BIGSERIAL).
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
