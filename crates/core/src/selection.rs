//! Summaries of the files a user selected for upload.

use std::path::Path;

/// How many file names the summary lists before collapsing the rest.
pub const SUMMARY_NAME_LIMIT: usize = 3;

/// Display name of a selected file (its final path component).
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Whether the backend will accept this file (it keeps `.pdf` uploads only).
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// `"2 files selected: a.pdf, b.pdf"`, collapsing names past the limit
/// into `+N more`.
pub fn summarize_selection<P: AsRef<Path>>(files: &[P]) -> String {
    match files.len() {
        0 => "No files selected".to_string(),
        n => {
            let mut names: Vec<String> = files
                .iter()
                .take(SUMMARY_NAME_LIMIT)
                .map(|p| display_name(p.as_ref()))
                .collect();
            if n > SUMMARY_NAME_LIMIT {
                names.push(format!("+{} more", n - SUMMARY_NAME_LIMIT));
            }
            let noun = if n == 1 { "file" } else { "files" };
            format!("{n} {noun} selected: {}", names.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn empty_selection() {
        let files: Vec<PathBuf> = Vec::new();
        assert_eq!(summarize_selection(&files), "No files selected");
    }

    #[test]
    fn short_selection_lists_every_name() {
        let files = ["/tmp/in/a.pdf", "b.pdf"];
        assert_eq!(summarize_selection(&files), "2 files selected: a.pdf, b.pdf");
        assert_eq!(summarize_selection(&["one.pdf"]), "1 file selected: one.pdf");
    }

    #[test]
    fn long_selection_is_truncated() {
        let files = ["a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf"];
        assert_eq!(
            summarize_selection(&files),
            "5 files selected: a.pdf, b.pdf, c.pdf, +2 more"
        );
    }

    #[test]
    fn pdf_detection_ignores_case() {
        assert!(is_pdf(Path::new("scan.PDF")));
        assert!(is_pdf(Path::new("dir/scan.pdf")));
        assert!(!is_pdf(Path::new("scan.png")));
        assert!(!is_pdf(Path::new("pdf")));
    }
}
