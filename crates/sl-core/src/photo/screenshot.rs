//! Screenshot filename grammar shared with the producing application:
//! `PREFIX_YYYY-MM-DD_HH-MM-SS.mmm_WIDTHxHEIGHT.ext`.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix written by the producer in front of every screenshot name.
pub const SCREENSHOT_PREFIX: &str = "VRChat";

const NAME_BODY: &str =
    r"VRChat_(\d{4}-\d{2}-\d{2})_(\d{2}-\d{2}-\d{2}\.\d{3})_(\d+)x(\d+)\.([A-Za-z0-9]+)";

static EXACT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{NAME_BODY}$")).expect("screenshot name pattern is valid")
});

static NAME_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(NAME_BODY).expect("screenshot name pattern is valid"));

/// A filename recognised as a producer screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotName {
    pub file_name: String,
    pub captured_at: NaiveDateTime,
    pub width: u32,
    pub height: u32,
    pub extension: String,
}

impl ScreenshotName {
    /// Parse a bare file name. Any deviation from the grammar yields `None`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = EXACT_NAME.captures(file_name)?;
        let captured_at = NaiveDateTime::parse_from_str(
            &format!("{} {}", &caps[1], &caps[2]),
            "%Y-%m-%d %H-%M-%S%.3f",
        )
        .ok()?;

        Some(Self {
            file_name: file_name.to_string(),
            captured_at,
            width: caps[3].parse().ok()?,
            height: caps[4].parse().ok()?,
            extension: caps[5].to_ascii_lowercase(),
        })
    }

    /// Parse the last component of `path`.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        Self::parse(path.file_name()?.to_str()?)
    }

    /// Capture time interpreted in the local zone of the producing machine.
    pub fn taken_at(&self) -> DateTime<Utc> {
        Local
            .from_local_datetime(&self.captured_at)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| self.captured_at.and_utc())
    }

    /// Find a screenshot path inside a free-form log line.
    ///
    /// The path starts after the last `": "` separator preceding the name,
    /// or at the line start when there is none.
    pub fn find_in_line(line: &str) -> Option<String> {
        let found = NAME_IN_TEXT.find(line)?;
        let head = &line[..found.start()];
        let path_start = head.rfind(": ").map(|idx| idx + 2).unwrap_or(0);
        let candidate = line[path_start..found.end()].trim();

        let name_start = candidate.len() - found.as_str().len();
        let boundary_ok = candidate[..name_start]
            .chars()
            .last()
            .map(|c| c == '/' || c == '\\' || c.is_whitespace())
            .unwrap_or(true);
        if !boundary_ok {
            return None;
        }
        Some(candidate.to_string())
    }
}
