//! Part catalog schema and operations

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{Category, Dimensions, PartRecord, Specifications};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Purchasable parts
        CREATE TABLE IF NOT EXISTS parts (
            id TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            name TEXT NOT NULL,
            brand TEXT,
            price INTEGER NOT NULL,
            stock INTEGER,
            wattage REAL,
            socket TEXT,
            ram_type TEXT,
            performance_score REAL,
            performance_tier INTEGER,
            width_mm REAL,
            height_mm REAL,
            depth_mm REAL
        );

        -- Specification sheet rows, in the order they were entered
        CREATE TABLE IF NOT EXISTS part_specs (
            part_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (part_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_parts_category ON parts(category);
        "#,
    )?;
    Ok(())
}

/// Insert or replace a part and its specification sheet
pub fn upsert_part(conn: &Connection, part: &PartRecord) -> Result<()> {
    let category: Category = part.category.parse()?;
    let price = i64::try_from(part.price).context("price out of range")?;
    let dims = part.dimensions;

    conn.execute(
        "INSERT OR REPLACE INTO parts (id, category, name, brand, price, stock, wattage, socket, ram_type,
                                       performance_score, performance_tier, width_mm, height_mm, depth_mm)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        rusqlite::params![
            &part.id,
            category.label(),
            &part.name,
            &part.brand,
            price,
            part.stock,
            part.wattage,
            &part.socket,
            &part.ram_type,
            part.performance_score,
            part.performance_tier,
            dims.map(|d| d.width),
            dims.map(|d| d.height),
            dims.map(|d| d.depth),
        ],
    )?;

    conn.execute("DELETE FROM part_specs WHERE part_id = ?1", [&part.id])?;
    for (position, (key, value)) in part.specifications.iter().enumerate() {
        conn.execute(
            "INSERT INTO part_specs (part_id, position, key, value) VALUES (?1, ?2, ?3, ?4)",
            (&part.id, position as i64, key, value),
        )?;
    }
    Ok(())
}

/// Clear the whole catalog (for re-import)
pub fn clear_catalog(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM part_specs;
        DELETE FROM parts;
        "#,
    )?;
    Ok(())
}

const PART_COLUMNS: &str = "id, category, name, brand, price, stock, wattage, socket, ram_type,
                            performance_score, performance_tier, width_mm, height_mm, depth_mm";

fn part_from_row(row: &Row<'_>) -> rusqlite::Result<PartRecord> {
    let price: i64 = row.get(4)?;
    let width: Option<f64> = row.get(11)?;
    let height: Option<f64> = row.get(12)?;
    let depth: Option<f64> = row.get(13)?;
    let dimensions = match (width, height, depth) {
        (None, None, None) => None,
        (w, h, d) => Some(Dimensions {
            width: w.unwrap_or_default(),
            height: h.unwrap_or_default(),
            depth: d.unwrap_or_default(),
        }),
    };

    Ok(PartRecord {
        id: row.get(0)?,
        category: row.get(1)?,
        name: row.get(2)?,
        brand: row.get(3)?,
        price: u64::try_from(price).unwrap_or_default(),
        stock: row.get(5)?,
        wattage: row.get(6)?,
        socket: row.get(7)?,
        ram_type: row.get(8)?,
        performance_score: row.get(9)?,
        performance_tier: row.get(10)?,
        dimensions,
        specifications: Specifications::new(),
    })
}

fn load_specs(conn: &Connection, part_id: &str) -> Result<Specifications> {
    let mut stmt =
        conn.prepare("SELECT key, value FROM part_specs WHERE part_id = ?1 ORDER BY position")?;
    let rows = stmt.query_map([part_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut specs = Specifications::new();
    for row in rows {
        let (key, value) = row?;
        specs.insert(key, value);
    }
    Ok(specs)
}

/// Look up a single part by id
pub fn get_part(conn: &Connection, id: &str) -> Result<Option<PartRecord>> {
    let sql = format!("SELECT {PART_COLUMNS} FROM parts WHERE id = ?1");
    let part = conn.query_row(&sql, [id], part_from_row).optional()?;

    match part {
        Some(mut part) => {
            part.specifications = load_specs(conn, &part.id)?;
            Ok(Some(part))
        }
        None => Ok(None),
    }
}

/// List parts, optionally restricted to one category
pub fn list_parts(conn: &Connection, category: Option<Category>) -> Result<Vec<PartRecord>> {
    let sql = format!(
        "SELECT {PART_COLUMNS} FROM parts WHERE ?1 IS NULL OR category = ?1 ORDER BY category, name"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([category.map(Category::label)], part_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        let mut part = row?;
        part.specifications = load_specs(conn, &part.id)?;
        results.push(part);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn stored_part_reads_back_with_ordered_specs() {
        let conn = open();
        let part = PartRecord::new("case-1", Category::Case, "Lancool 216")
            .with_brand("Lian Li")
            .with_price(549_900)
            .with_stock(4)
            .with_dimensions(215.0, 480.0, 435.0)
            .with_spec("Type", "ATX Mid Tower")
            .with_spec("Max GPU Length", "392")
            .with_spec("Mobo Support", "E-ATX, ATX, M-ATX, ITX");
        upsert_part(&conn, &part).unwrap();

        let loaded = get_part(&conn, "case-1").unwrap().unwrap();
        assert_eq!(loaded, part);
        assert!(get_part(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn upsert_replaces_spec_sheet() {
        let conn = open();
        let part = PartRecord::new("cpu-1", Category::Cpu, "Ryzen 5 7600")
            .with_spec("Socket", "AM5")
            .with_spec("Cores", "6");
        upsert_part(&conn, &part).unwrap();

        let revised = PartRecord::new("cpu-1", Category::Cpu, "Ryzen 5 7600").with_spec("Socket", "AM5");
        upsert_part(&conn, &revised).unwrap();

        let loaded = get_part(&conn, "cpu-1").unwrap().unwrap();
        assert_eq!(loaded.specifications.len(), 1);
    }

    #[test]
    fn category_is_stored_canonically_and_filterable() {
        let conn = open();
        let mut psu = PartRecord::new("psu-1", Category::Psu, "RM850x");
        psu.category = "power supply".to_string();
        upsert_part(&conn, &psu).unwrap();
        upsert_part(&conn, &PartRecord::new("gpu-1", Category::Gpu, "RX 7800 XT")).unwrap();

        let psus = list_parts(&conn, Some(Category::Psu)).unwrap();
        assert_eq!(psus.len(), 1);
        assert_eq!(psus[0].category, "PSU");
        assert_eq!(list_parts(&conn, None).unwrap().len(), 2);

        clear_catalog(&conn).unwrap();
        assert!(list_parts(&conn, None).unwrap().is_empty());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let conn = open();
        let mut part = PartRecord::new("x", Category::Cpu, "Monitor 27in");
        part.category = "Monitor".to_string();
        assert!(upsert_part(&conn, &part).is_err());
    }
}
