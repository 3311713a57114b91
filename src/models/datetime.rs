//! Date-time column conventions. SQLite has no native date type; every
//! timestamp column stores the `%Y-%m-%d %H:%M:%S` text form, which also
//! matches what `datetime('now')` produces in defaults.

use chrono::NaiveDateTime;

pub const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn to_db(dt: NaiveDateTime) -> String {
    dt.format(DB_FORMAT).to_string()
}

pub fn from_db(s: &str) -> Result<NaiveDateTime, sqlx::Error> {
    NaiveDateTime::parse_from_str(s, DB_FORMAT).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub fn opt_from_db(s: Option<&str>) -> Result<Option<NaiveDateTime>, sqlx::Error> {
    s.map(from_db).transpose()
}
