//! Demo routes, one module per path pattern.

use chrono::{SecondsFormat, Utc};

pub mod index;
pub mod simple;
pub mod users;

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
