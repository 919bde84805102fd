// Staged job output.
//
// Jobs write their part files into a hidden staging directory next to the
// target and only move it into place once every partition has succeeded. A
// failed run leaves the previous output (if any) untouched.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::debug;

/// File name of the Nth output part.
pub fn part_name(index: usize) -> String {
    format!("part-{index:05}")
}

/// Write one row per line to `path`. Returns the number of rows written.
pub fn write_rows<I, D>(path: &Path, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = D>,
    D: Display,
{
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let mut written = 0;
    for row in rows {
        writeln!(out, "{row}").with_context(|| format!("Failed to write {}", path.display()))?;
        written += 1;
    }
    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(written)
}

/// An output directory under construction.
pub struct StagedOutput {
    target: PathBuf,
    staging: TempDir,
}

impl StagedOutput {
    pub fn create(target: &Path) -> Result<Self> {
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&parent)
            .with_context(|| format!("Failed to create staging directory in {}", parent.display()))?;

        debug!(target = %target.display(), staging = %staging.path().display(), "Staging output");
        Ok(Self {
            target: target.to_path_buf(),
            staging,
        })
    }

    /// Directory the part files go into until commit.
    pub fn dir(&self) -> &Path {
        self.staging.path()
    }

    pub fn part_path(&self, index: usize) -> PathBuf {
        self.dir().join(part_name(index))
    }

    /// Replace the target with the staged directory.
    pub fn commit(self) -> Result<PathBuf> {
        if self.target.is_dir() {
            fs::remove_dir_all(&self.target)
                .with_context(|| format!("Failed to remove old output {}", self.target.display()))?;
        } else if self.target.exists() {
            fs::remove_file(&self.target)
                .with_context(|| format!("Failed to remove old output {}", self.target.display()))?;
        }

        fs::rename(self.staging.path(), &self.target).with_context(|| {
            format!("Failed to move output into place at {}", self.target.display())
        })?;
        // The TempDir guard now points at a path that no longer exists; its
        // cleanup on drop is a no-op.
        Ok(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_replaces_target() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("out");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("stale"), "old").unwrap();

        let staged = StagedOutput::create(&target).unwrap();
        write_rows(&staged.part_path(0), ["a", "b"]).unwrap();
        let committed = staged.commit().unwrap();

        assert_eq!(committed, target);
        assert!(!target.join("stale").exists());
        assert_eq!(fs::read_to_string(target.join("part-00000")).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_dropped_stage_leaves_target() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("out");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "old").unwrap();

        {
            let staged = StagedOutput::create(&target).unwrap();
            write_rows(&staged.part_path(0), ["x"]).unwrap();
        }

        assert!(target.join("keep").exists());
        let leftovers = fs::read_dir(root.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_part_names() {
        assert_eq!(part_name(0), "part-00000");
        assert_eq!(part_name(42), "part-00042");
    }
}
