//! Downloadable artifact kinds produced by a finished job.

use crate::job::Downloads;

/// A named output the backend exposes once a job is `done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ReceiptsUnstamped,
    ReceiptsStamped,
    CreditNotes,
    All,
    CsvLog,
}

impl ArtifactKind {
    /// Render order for the downloads list.
    pub const ALL: [ArtifactKind; 5] = [
        Self::ReceiptsUnstamped,
        Self::ReceiptsStamped,
        Self::CreditNotes,
        Self::All,
        Self::CsvLog,
    ];

    /// Key used in the `downloads` mapping of a status response.
    pub fn key(self) -> &'static str {
        match self {
            Self::ReceiptsUnstamped => "receipts_unstamped_zip",
            Self::ReceiptsStamped => "receipts_stamped_zip",
            Self::CreditNotes => "credit_notes_zip",
            Self::All => "all_zip",
            Self::CsvLog => "csv_log",
        }
    }

    /// Human-readable label for a download link.
    pub fn label(self) -> &'static str {
        match self {
            Self::ReceiptsUnstamped => "Receipts (unstamped) ZIP",
            Self::ReceiptsStamped => "Receipts (stamped) ZIP",
            Self::CreditNotes => "Credit notes ZIP",
            Self::All => "All output ZIP",
            Self::CsvLog => "Classification CSV log",
        }
    }

    /// Short name used by the download route and local file names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::ReceiptsUnstamped => "receipts_unstamped",
            Self::ReceiptsStamped => "receipts_stamped",
            Self::CreditNotes => "credit_notes",
            Self::All => "all",
            Self::CsvLog => "csv",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::CsvLog => "csv",
            _ => "zip",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

/// Artifacts present in a `downloads` mapping, in render order.
///
/// Keys with a `null` or blank path and keys the client does not know
/// are skipped.
pub fn present_artifacts(downloads: &Downloads) -> Vec<(ArtifactKind, &str)> {
    ArtifactKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let path = downloads.get(kind.key())?.as_deref()?;
            if path.trim().is_empty() {
                None
            } else {
                Some((kind, path))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloads(entries: &[(&str, Option<&str>)]) -> Downloads {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn key_round_trips_for_every_kind() {
        for kind in ArtifactKind::ALL {
            assert_eq!(ArtifactKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(ArtifactKind::from_key("thumbnails_zip"), None);
    }

    #[test]
    fn only_present_entries_are_returned() {
        let d = downloads(&[("csv_log", Some("/files/abc.csv"))]);
        assert_eq!(
            present_artifacts(&d),
            vec![(ArtifactKind::CsvLog, "/files/abc.csv")]
        );
    }

    #[test]
    fn null_blank_and_unknown_entries_are_skipped() {
        let d = downloads(&[
            ("all_zip", None),
            ("credit_notes_zip", Some("  ")),
            ("thumbnails_zip", Some("/x.zip")),
            ("receipts_stamped_zip", Some("/s.zip")),
        ]);
        assert_eq!(
            present_artifacts(&d),
            vec![(ArtifactKind::ReceiptsStamped, "/s.zip")]
        );
    }

    #[test]
    fn entries_follow_render_order() {
        let d = downloads(&[
            ("csv_log", Some("/c")),
            ("all_zip", Some("/a")),
            ("receipts_unstamped_zip", Some("/u")),
        ]);
        let kinds: Vec<_> = present_artifacts(&d).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                ArtifactKind::ReceiptsUnstamped,
                ArtifactKind::All,
                ArtifactKind::CsvLog
            ]
        );
    }
}
