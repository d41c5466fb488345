//! The flat text manifest: one `<rel_path>  <digest>` line per file, then a
//! single version line. No header, no count.

use crate::error::ManifestError;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Trailing line written when the run was started in only-hash mode.
pub const NO_VERSION: &str = "--NO VERSION--";
/// Output file name used when no custom name is given.
pub const DEFAULT_FILE_NAME: &str = "file_hashes.txt";
pub const OUTPUT_EXTENSION: &str = ".txt";
/// Separator between path and digest. Paths are not escaped.
pub const SEPARATOR: &str = "  ";

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub rel_path: String,
    pub digest: String,
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.rel_path, SEPARATOR, self.digest)
    }
}

impl ManifestEntry {
    /// Split a manifest line at the last two-space separator.
    pub fn parse_line(line: &str) -> Option<Self> {
        let (path, digest) = line.rsplit_once(SEPARATOR)?;
        Some(Self { rel_path: path.to_string(), digest: digest.to_string() })
    }
}

/// Append `.txt` to a user-supplied file name unless it already ends with it.
pub fn custom_output_name(name: &str) -> String {
    if name.ends_with(OUTPUT_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{OUTPUT_EXTENSION}")
    }
}

/// Write-through manifest writer. Every line goes to the OS as soon as it is
/// appended, so an interrupted run leaves a valid prefix on disk.
pub struct ManifestWriter {
    file: File,
    path: PathBuf,
    entries: usize,
}

impl ManifestWriter {
    /// Create or truncate `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file, path: path.to_path_buf(), entries: 0 })
    }

    pub fn append(&mut self, entry: &ManifestEntry) -> io::Result<()> {
        // whole line in a single write
        self.file.write_all(format!("{entry}\n").as_bytes())?;
        self.file.flush()?;
        self.entries += 1;
        Ok(())
    }

    /// Write the trailing version line and sync the file. Consumes the writer.
    pub fn finish(mut self, version_line: &str) -> io::Result<usize> {
        self.file.write_all(format!("{version_line}\n").as_bytes())?;
        self.file.sync_all()?;
        Ok(self.entries)
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A parsed manifest.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    pub version: String,
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut lines: Vec<(usize, &str)> =
            text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect();
        while matches!(lines.last(), Some((_, l)) if l.is_empty()) {
            lines.pop();
        }
        let (_, version) = lines.pop().ok_or(ManifestError::Empty)?;
        let entries = lines
            .into_iter()
            .map(|(n, l)| {
                ManifestEntry::parse_line(l).ok_or(ManifestError::MissingSeparator { line: n })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries, version: version.to_string() })
    }

    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn is_unversioned(&self) -> bool {
        self.version == NO_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_line_format() {
        let e = ManifestEntry { rel_path: "sub/b.txt".into(), digest: "7c211433f0207159".into() };
        assert_eq!(e.to_string(), "sub/b.txt  7c211433f0207159");
    }

    #[test]
    fn parse_takes_last_separator() {
        let e = ManifestEntry::parse_line("my  file.txt  aaf4c61ddcc5e8a2").unwrap();
        assert_eq!(e.rel_path, "my  file.txt");
        assert_eq!(e.digest, "aaf4c61ddcc5e8a2");
    }

    #[test]
    fn parse_error_digest_keeps_message() {
        let m =
            Manifest::parse("x  Error: [Errno 13] Permission denied\n--NO VERSION--\n").unwrap();
        assert_eq!(m.entries[0].rel_path, "x");
        assert!(m.entries[0].digest.starts_with("Error: "));
        assert!(m.is_unversioned());
    }

    #[test]
    fn parse_version_only() {
        let m = Manifest::parse("v1.0\n").unwrap();
        assert!(m.entries.is_empty());
        assert_eq!(m.version, "v1.0");
    }

    #[test]
    fn parse_rejects_empty_and_bad_lines() {
        assert!(matches!(Manifest::parse(""), Err(ManifestError::Empty)));
        assert!(matches!(
            Manifest::parse("a  0123456789abcdef\nbroken\nv1\n"),
            Err(ManifestError::MissingSeparator { line: 2 })
        ));
    }

    #[test]
    fn appended_lines_are_whole_on_disk_before_finish() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("m.txt");
        let mut w = ManifestWriter::create(&p).unwrap();
        w.append(&ManifestEntry { rel_path: "a b".into(), digest: "aaf4c61ddcc5e8a2".into() })
            .unwrap();
        assert_eq!(std::fs::read_to_string(&p).unwrap(), "a b  aaf4c61ddcc5e8a2\n");
        w.append(&ManifestEntry { rel_path: "c".into(), digest: "Error: denied".into() }).unwrap();
        assert_eq!(
            std::fs::read_to_string(&p).unwrap(),
            "a b  aaf4c61ddcc5e8a2\nc  Error: denied\n"
        );
        assert_eq!(w.finish("v1").unwrap(), 2);
        assert!(std::fs::read_to_string(&p).unwrap().ends_with("denied\nv1\n"));
    }

    #[test]
    fn custom_names_get_txt() {
        assert_eq!(custom_output_name("report"), "report.txt");
        assert_eq!(custom_output_name("report.txt"), "report.txt");
        assert_eq!(custom_output_name("report.csv"), "report.csv.txt");
    }
}
