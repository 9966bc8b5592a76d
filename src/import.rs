//! Catalog import from JSON part files
//!
//! Walks a directory tree for `*.json` files. Each file holds either a single
//! part record or an array of them. Records are validated through the same
//! normalization the rule engine uses before they reach the database.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rusqlite::Connection;
use serde_json::Value;
use walkdir::WalkDir;

use crate::db;
use crate::models::{Component, PartRecord};

/// Find all JSON files under `dir`
pub fn find_part_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// Parse a part file into its raw records; a file holds one object or an array.
fn parse_part_file(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(match parsed {
        Value::Array(records) => records,
        record => vec![record],
    })
}

/// Import every part file under `dir` into the catalog
pub fn import_directory(conn: &Connection, dir: &Path) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    info!("Scanning {} for part files", dir.display());
    let files = find_part_files(dir);
    info!("Found {} part files", files.len());

    for path in &files {
        let records = match parse_part_file(path) {
            Ok(records) => records,
            Err(e) => {
                warn!("{:#}", e);
                stats.errors += 1;
                continue;
            }
        };
        stats.files += 1;

        for (index, raw) in records.into_iter().enumerate() {
            let record: PartRecord = match serde_json::from_value(raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping record {} in {}: {}", index, path.display(), e);
                    stats.skipped += 1;
                    continue;
                }
            };
            if record.id.trim().is_empty() {
                warn!("Skipping part without id in {}", path.display());
                stats.skipped += 1;
                continue;
            }
            match Component::from_record(&record) {
                Ok(component) => {
                    db::upsert_part(conn, &record)?;
                    debug!(
                        "Imported {} ({}, {}W)",
                        component.model,
                        component.category,
                        component.wattage.unwrap_or(0.0)
                    );
                    stats.parts += 1;
                }
                Err(e) => {
                    warn!("Skipping '{}' in {}: {}", record.id, path.display(), e);
                    stats.skipped += 1;
                }
            }
        }
    }

    Ok(stats)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub files: usize,
    pub parts: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {} parts from {} files. Skipped: {}, Errors: {}",
            self.parts, self.files, self.skipped, self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn imports_single_and_array_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("cpu.json"),
            r#"{"id": "cpu-1", "category": "CPU", "name": "Ryzen 7 7700", "price": 1899000,
                "wattage": 65, "specifications": {"Socket": "AM5"}}"#,
        )
        .unwrap();
        fs::create_dir(dir.path().join("gpus")).unwrap();
        fs::write(
            dir.path().join("gpus/all.json"),
            r#"[
                {"id": "gpu-1", "category": "GPU", "model": "RTX 4070", "price": 3600000, "performanceTier": 3},
                {"id": "mon-1", "category": "Monitor", "name": "27in 144Hz", "price": 900000},
                {"category": "GPU", "name": "No Id", "price": 1}
            ]"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let stats = import_directory(&conn, dir.path()).unwrap();

        assert_eq!(
            stats,
            ImportStats {
                files: 2,
                parts: 2,
                skipped: 2,
                errors: 1
            }
        );

        let gpus = db::list_parts(&conn, Some(Category::Gpu)).unwrap();
        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].name, "RTX 4070");
        assert_eq!(gpus[0].performance_tier, Some(3));

        let cpu = db::get_part(&conn, "cpu-1").unwrap().unwrap();
        assert_eq!(cpu.specifications.get("socket"), Some("AM5"));
        assert_eq!(cpu.wattage, Some(65.0));
    }

    #[test]
    fn malformed_record_does_not_drop_its_neighbours() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("mixed.json"),
            r#"[
                {"id": "gpu-2", "category": "GPU", "name": "RX 7800 XT", "price": 2899500},
                {"id": "cpu-2", "category": "CPU", "name": "Ryzen 5 7600", "price": 12499.5},
                42
            ]"#,
        )
        .unwrap();

        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let stats = import_directory(&conn, dir.path()).unwrap();

        assert_eq!(
            stats,
            ImportStats {
                files: 1,
                parts: 1,
                skipped: 2,
                errors: 0
            }
        );
        assert!(db::get_part(&conn, "gpu-2").unwrap().is_some());
        assert!(db::get_part(&conn, "cpu-2").unwrap().is_none());
    }

    #[test]
    fn finds_only_json_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "[]").unwrap();
        fs::write(dir.path().join("a.json"), "[]").unwrap();
        fs::write(dir.path().join("c.csv"), "").unwrap();

        let files = find_part_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
