//! Producer session log: locating, tailing and parsing.

mod locator;
pub mod parser;
mod tail;

pub use locator::{newest_log_file, LogSessionSource, LOG_FILE_PREFIX};
pub use parser::{parse_session, reduce_roster, session_window, RosterEvent};
pub use tail::LogTail;
