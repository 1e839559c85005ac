use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::shared::error::PipelineError;

/// Display unit for artifact sizes. Both use binary multiples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeUnit {
    Kilobytes,
    Megabytes,
}

impl SizeUnit {
    pub fn divisor(&self) -> f64 {
        match self {
            SizeUnit::Kilobytes => 1024.0,
            SizeUnit::Megabytes => 1024.0 * 1024.0,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            SizeUnit::Kilobytes => "KB",
            SizeUnit::Megabytes => "MB",
        }
    }

    /// `bytes` in this unit with two decimals, e.g. `"1.50 MB"`.
    pub fn format(&self, bytes: u64) -> String {
        format!("{:.2} {}", bytes as f64 / self.divisor(), self.suffix())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SizeEntry {
    pub path: PathBuf,
    pub bytes: u64,
}

/// On-disk sizes of a source and the artifacts derived from it.
///
/// The first entry is the reference every other entry is compared against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeReport {
    entries: Vec<SizeEntry>,
}

impl SizeReport {
    pub fn entries(&self) -> &[SizeEntry] {
        &self.entries
    }

    pub fn original(&self) -> Option<&SizeEntry> {
        self.entries.first()
    }

    /// Size of entry `index` as a percentage of the first entry.
    ///
    /// `None` if the index is out of range or the first entry is empty.
    pub fn relative_percent(&self, index: usize) -> Option<f64> {
        let original = self.original()?.bytes;
        let entry = self.entries.get(index)?;
        if original == 0 {
            return None;
        }
        Some(entry.bytes as f64 / original as f64 * 100.0)
    }

    /// One line per entry: `path: 1.23 MB (45.6% of original)`.
    pub fn lines(&self, unit: SizeUnit) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let size = unit.format(entry.bytes);
                match self.relative_percent(i) {
                    Some(pct) if i > 0 => {
                        format!("{}: {size} ({pct:.1}% of original)", entry.path.display())
                    }
                    _ => format!("{}: {size}", entry.path.display()),
                }
            })
            .collect()
    }
}

/// Reads the byte length of every path, in order.
///
/// Fails with `ArtifactMissing` at the first path that does not exist.
pub fn compare<P: AsRef<Path>>(paths: &[P]) -> Result<SizeReport, PipelineError> {
    let entries = paths
        .iter()
        .map(|p| {
            let path = p.as_ref();
            match std::fs::metadata(path) {
                Ok(meta) => Ok(SizeEntry {
                    path: path.to_path_buf(),
                    bytes: meta.len(),
                }),
                Err(e) if e.kind() == ErrorKind::NotFound => Err(PipelineError::ArtifactMissing {
                    path: path.to_path_buf(),
                }),
                Err(e) => Err(PipelineError::Io(e)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SizeReport { entries })
}
