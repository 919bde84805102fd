// Reading flat record files.
//
// An input path is either one file or a directory of part files (the layout
// the parse job writes). Each file is one partition for the stats stages.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{EntityContent, FlatRecord};

/// List the partition files behind an input path.
///
/// Directories contribute their regular, non-hidden files in name order.
pub fn partition_files(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        anyhow::bail!("Input path {} does not exist", input.display());
    }

    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)
        .with_context(|| format!("Failed to list input directory {}", input.display()))?
    {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.') || n.starts_with('_'));
        if path.is_file() && !hidden {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("Input directory {} contains no data files", input.display());
    }
    Ok(files)
}

/// Read every record of one partition file as (entity, content) pairs.
///
/// Any unreadable or malformed line aborts the partition, blank lines
/// included.
pub fn read_entity_contents(path: &Path) -> Result<Vec<EntityContent>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open record file {}", path.display()))?;

    let mut rows = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {} line {}", path.display(), idx + 1))?;
        let record = FlatRecord::parse_line(&line)
            .with_context(|| format!("Bad record in {} at line {}", path.display(), idx + 1))?;
        rows.push(record.into_entity_content());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_directory_of_parts() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = File::create(dir.path().join("part-00000")).unwrap();
        writeln!(f, "1\tA \ta@x.com\ts\td\t\thello\\nworld").unwrap();
        File::create(dir.path().join(".hidden")).unwrap();

        let files = partition_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);

        let rows = read_entity_contents(&files[0]).unwrap();
        assert_eq!(rows, vec![EntityContent::new("a@x.com", "hello\nworld")]);
    }

    #[test]
    fn test_malformed_line_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad");
        fs::write(&path, "only\ttwo\n").unwrap();
        assert!(read_entity_contents(&path).is_err());
    }

    #[test]
    fn test_blank_line_between_records_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part-00000");
        fs::write(
            &path,
            "1\tA\ta@x.com\ts\td\t\tone\n\n2\tB\tb@x.com\ts\td\t\ttwo\n",
        )
        .unwrap();

        let err = read_entity_contents(&path).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn test_missing_input() {
        assert!(partition_files(Path::new("/definitely/not/here")).is_err());
    }
}
