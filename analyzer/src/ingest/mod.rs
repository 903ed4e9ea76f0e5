pub mod table;

pub use table::{ColumnMap, TrafficTable};

use std::path::{Path, PathBuf};

/// Next free versioned output name beside the input: `name_1.csv`,
/// `name_2.csv`, and so on. Never clobbers an earlier run.
pub fn versioned_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("csv");
    let dir = input.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut index = 1;
    loop {
        let candidate = dir.join(format!("{stem}_{index}.{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn versioned_name_skips_existing_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("export.csv");
        fs::write(&input, "x").unwrap();

        assert_eq!(versioned_output_path(&input), dir.path().join("export_1.csv"));

        fs::write(dir.path().join("export_1.csv"), "x").unwrap();
        fs::write(dir.path().join("export_2.csv"), "x").unwrap();
        assert_eq!(versioned_output_path(&input), dir.path().join("export_3.csv"));
    }
}
