// ABOUTME: Backup archive naming and "latest backup" selection.
// ABOUTME: Archives are named <project>-<unixSeconds>.tgz inside the project's backup directory.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::project::ProjectName;

const ARCHIVE_EXT: &str = ".tgz";

/// Archive file name for a snapshot taken at `at`.
pub fn archive_name(project: &ProjectName, at: DateTime<Utc>) -> String {
    format!("{}-{}{}", project, at.timestamp(), ARCHIVE_EXT)
}

/// Unix timestamp encoded in an archive name, if it follows the naming scheme.
pub fn archive_timestamp(project: &ProjectName, archive: &str) -> Option<i64> {
    archive
        .strip_prefix(project.as_str())?
        .strip_prefix('-')?
        .strip_suffix(ARCHIVE_EXT)?
        .parse()
        .ok()
}

/// How rollback picks an archive when none is named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupSelection {
    /// Lexicographically greatest file name.
    ///
    /// Matches chronological order only while every timestamp has the same
    /// number of digits: `demo-50.tgz` sorts after `demo-200.tgz`.
    #[default]
    Lexical,
    /// Greatest timestamp parsed from the name. Entries that don't follow the
    /// naming scheme rank below every entry that does.
    Chronological,
}

impl BackupSelection {
    pub fn latest<'a>(&self, project: &ProjectName, entries: &'a [String]) -> Option<&'a str> {
        let latest = match self {
            BackupSelection::Lexical => entries.iter().max(),
            BackupSelection::Chronological => entries
                .iter()
                .max_by_key(|entry: &&'a String| (archive_timestamp(project, entry), *entry)),
        };
        latest.map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> ProjectName {
        ProjectName::new("demo").unwrap()
    }

    fn entries(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn archive_name_uses_whole_seconds() {
        let at = DateTime::from_timestamp(1_700_000_000, 999_000_000).unwrap();
        assert_eq!(archive_name(&demo(), at), "demo-1700000000.tgz");
    }

    #[test]
    fn timestamp_is_parsed_back_from_name() {
        assert_eq!(archive_timestamp(&demo(), "demo-200.tgz"), Some(200));
        assert_eq!(archive_timestamp(&demo(), "other-200.tgz"), None);
        assert_eq!(archive_timestamp(&demo(), "demo-x.tgz"), None);
        assert_eq!(archive_timestamp(&demo(), "demo-200.tar"), None);
    }

    #[test]
    fn lexical_selection_diverges_across_digit_widths() {
        let list = entries(&["demo-100.tgz", "demo-200.tgz", "demo-50.tgz"]);
        assert_eq!(
            BackupSelection::Lexical.latest(&demo(), &list),
            Some("demo-50.tgz")
        );
    }

    #[test]
    fn chronological_selection_compares_timestamps() {
        let list = entries(&["demo-100.tgz", "demo-200.tgz", "demo-50.tgz"]);
        assert_eq!(
            BackupSelection::Chronological.latest(&demo(), &list),
            Some("demo-200.tgz")
        );
    }

    #[test]
    fn chronological_ranks_foreign_names_lowest() {
        let list = entries(&["zzz-manual.tgz", "demo-5.tgz"]);
        assert_eq!(
            BackupSelection::Chronological.latest(&demo(), &list),
            Some("demo-5.tgz")
        );
    }

    #[test]
    fn empty_listing_has_no_latest() {
        assert_eq!(BackupSelection::Lexical.latest(&demo(), &[]), None);
    }
}
