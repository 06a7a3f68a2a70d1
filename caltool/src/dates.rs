//! Date arguments for `-filter`.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

const BUILTIN_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d %b %Y", "%b %d %Y", "%B %d, %Y"];

/// Environment variable naming a file of extra date patterns, one per line.
pub const DATEMSK: &str = "DATEMSK";

/// Date patterns tried in order: the built-in list, then any from `DATEMSK`.
pub struct DatePatterns {
    patterns: Vec<String>,
}

impl DatePatterns {
    pub fn builtin() -> Self {
        DatePatterns {
            patterns: BUILTIN_FORMATS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let mut patterns = Self::builtin();
        if let Some(path) = std::env::var_os(DATEMSK) {
            patterns.extend_from_file(Path::new(&path))?;
        }
        Ok(patterns)
    }

    fn extend_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .context("Problem with DATEMSK environment variable or template file.")?;
        self.patterns.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        );
        Ok(())
    }

    /// `today`, or the first pattern that parses the whole value.
    pub fn parse(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("today") {
            return Some(Local::now().date_naive());
        }
        self.patterns
            .iter()
            .find_map(|p| NaiveDate::parse_from_str(value, p).ok())
    }
}

/// Inclusive wall-clock range; an open end is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl DateRange {
    /// `from` starts at midnight, `to` ends at the last second of its day.
    pub fn parse(patterns: &DatePatterns, from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let from = match from {
            Some(value) => match patterns.parse(value) {
                Some(date) => Some(date.and_time(NaiveTime::MIN)),
                None => bail!("The 'from' date could not be interpreted."),
            },
            None => None,
        };

        let to = match to {
            Some(value) => match patterns.parse(value) {
                Some(date) => date.and_hms_opt(23, 59, 59),
                None => bail!("The 'to' date could not be interpreted."),
            },
            None => None,
        };

        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                bail!("ERROR: 'from \"date\"' must occur earlier than 'to \"date\"'.");
            }
        }

        Ok(DateRange { from, to })
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}
