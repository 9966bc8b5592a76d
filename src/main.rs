//! PC Build Calculator
//!
//! Compatibility checks, bottleneck verdicts and frame-rate estimates for
//! custom PC builds assembled from a part catalog.

mod bottleneck;
mod compatibility;
mod db;
mod fps;
mod import;
mod models;
mod normalize;
mod summary;
mod tier;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, warn};
use rusqlite::Connection;

use crate::models::{Build, Category, Component, PartRecord, Resolution};

#[derive(Parser)]
#[command(name = "rig-calculator")]
#[command(about = "Compatibility and performance calculator for custom PC builds")]
struct Cli {
    /// Path to the SQLite part catalog
    #[arg(short, long, env = "RIG_DATABASE", default_value = "rig_catalog.db")]
    database: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import part records from a directory of JSON files
    Import {
        /// Directory containing part files
        source_dir: PathBuf,

        /// Clear the catalog before importing
        #[arg(long)]
        clear: bool,
    },

    /// Check a build assembled from catalog part ids
    Check {
        /// Part id to add; repeat for each part (storage may repeat)
        #[arg(short, long = "part", required = true)]
        parts: Vec<String>,

        /// Target resolution: 1080p, 1440p or 4K
        #[arg(short, long, default_value = "1440p")]
        resolution: Resolution,

        /// Add parts even when they conflict with the build
        #[arg(long)]
        force: bool,

        /// Show the estimated FPS curve
        #[arg(long)]
        chart: bool,

        /// Print the text summary handed to the build advisor
        #[arg(long)]
        context: bool,
    },

    /// List parts in the catalog
    ListParts {
        /// Only list this category (e.g. CPU, GPU, PSU)
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Show details for a specific part
    Part {
        /// Part id
        id: String,
    },

    /// Initialize empty catalog with schema
    Init,

    /// Load a sample catalog for trying out builds
    LoadSample,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Import { source_dir, clear } => {
            if clear {
                println!("Clearing existing catalog...");
                db::clear_catalog(&conn)?;
            }

            let stats = import::import_directory(&conn, &source_dir)?;
            println!("{}", stats);
        }

        Commands::Check {
            parts,
            resolution,
            force,
            chart,
            context,
        } => {
            let build = assemble_build(&conn, &parts, force)?;

            let issues = compatibility::check_compatibility(&build);
            let bottleneck = bottleneck::calculate_bottleneck(&build, resolution);

            println!("{}", summary::summarize(&build));

            println!("=== Compatibility ===");
            if issues.is_empty() {
                println!("No issues detected");
            }
            for issue in &issues {
                println!("{}", issue);
            }
            println!();

            println!("=== Bottleneck ({}) ===", resolution);
            println!("{}", bottleneck);
            println!();

            println!("=== Estimated FPS ({}) ===", resolution);
            match fps::estimate_fps(&build, resolution) {
                Some(estimate) if chart => print!("{}", estimate),
                Some(estimate) => println!("Average: {} fps", estimate.average_fps),
                None => println!("Add both a CPU and GPU to estimate frame rates."),
            }

            if context {
                println!();
                print!("{}", summary::advisor_context(&build, &issues, &bottleneck));
            }
        }

        Commands::ListParts { category } => {
            let parts = db::list_parts(&conn, category)?;
            if parts.is_empty() {
                println!("No parts in catalog. Run 'import' or 'load-sample' first.");
            } else {
                println!(
                    "{:<14} {:<12} {:<40} {:>16} {:>8}",
                    "ID", "Category", "Name", "Price", "Watts"
                );
                println!("{}", "-".repeat(94));
                for p in parts {
                    println!(
                        "{:<14} {:<12} {:<40} {:>16} {:>8.0}",
                        p.id,
                        p.category,
                        p.name,
                        summary::format_price(p.price),
                        p.wattage.unwrap_or(0.0)
                    );
                }
            }
        }

        Commands::Part { id } => {
            let Some(record) = db::get_part(&conn, &id)? else {
                println!("Part '{}' not found", id);
                return Ok(());
            };
            let part = Component::from_record(&record)?;

            println!("Part: {}", part.model);
            println!("  ID: {}", part.id);
            println!("  Category: {}", part.category);
            if let Some(brand) = &part.brand {
                println!("  Brand: {}", brand);
            }
            println!("  Price: {}", summary::format_price(part.price));
            if let Some(stock) = part.stock {
                println!("  Stock: {}", stock);
            }
            match (part.category, part.psu_capacity, part.wattage) {
                (Category::Psu, Some(capacity), _) => println!("  Capacity: {:.0}W", capacity),
                (_, _, Some(watts)) => println!("  Wattage: {:.0}W", watts),
                _ => {}
            }
            if matches!(part.category, Category::Cpu | Category::Gpu) {
                println!("  Performance tier: {}", tier::tier(&part));
            }
            if !part.specifications.is_empty() {
                println!("  Specifications ({}):", part.specifications.len());
                for (key, value) in part.specifications.iter() {
                    println!("    {}: {}", key, value);
                }
            }
        }

        Commands::Init => {
            println!("Catalog initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            load_sample_data(&conn)?;
            println!("Sample catalog loaded successfully!");
        }
    }

    Ok(())
}

/// Look up each part id and add it to a build, gating on hard conflicts.
fn assemble_build(conn: &Connection, ids: &[String], force: bool) -> Result<Build> {
    let mut build = Build::new();
    for id in ids {
        let record = db::get_part(conn, id)?.ok_or_else(|| anyhow!("Part '{}' not found", id))?;
        let part = Component::from_record(&record)?;
        debug!("Adding {} to {}", part.model, part.category);

        if force {
            if part.stock == Some(0) {
                warn!("{} is out of stock", part.model);
            }
            build.select(part);
        } else {
            build
                .try_select(part)
                .with_context(|| format!("Cannot add part '{}' (use --force to add anyway)", id))?;
        }
    }
    Ok(build)
}

/// Load a sample part catalog for trying builds without an import
fn load_sample_data(conn: &Connection) -> Result<()> {
    db::clear_catalog(conn)?;

    let parts = vec![
        PartRecord::new("cpu-7800x3d", Category::Cpu, "Ryzen 7 7800X3D")
            .with_brand("AMD")
            .with_price(2_499_000)
            .with_stock(6)
            .with_wattage(120.0)
            .with_score(92.0)
            .with_spec("Socket", "AM5")
            .with_spec("Supported Memory", "DDR5"),
        PartRecord::new("cpu-7600", Category::Cpu, "Ryzen 5 7600")
            .with_brand("AMD")
            .with_price(1_199_500)
            .with_stock(12)
            .with_wattage(65.0)
            .with_score(70.0)
            .with_spec("Socket", "AM5")
            .with_spec("Supported Memory", "DDR5"),
        PartRecord::new("cpu-12100f", Category::Cpu, "Core i3-12100F")
            .with_brand("Intel")
            .with_price(499_500)
            .with_stock(20)
            .with_wattage(58.0)
            .with_score(40.0)
            .with_spec("Socket", "LGA 1700")
            .with_spec("Memory Type", "DDR4, DDR5"),
        PartRecord::new("gpu-4090", Category::Gpu, "GeForce RTX 4090 Gaming OC")
            .with_brand("Gigabyte")
            .with_price(11_999_500)
            .with_stock(2)
            .with_wattage(450.0)
            .with_tier(4)
            .with_spec("Length (Depth) (mm)", "340"),
        PartRecord::new("gpu-4060", Category::Gpu, "GeForce RTX 4060 Ventus 2X")
            .with_brand("MSI")
            .with_price(1_849_500)
            .with_stock(15)
            .with_wattage(115.0)
            .with_tier(2)
            .with_dimensions(120.0, 42.0, 199.0),
        PartRecord::new("mobo-b650", Category::Motherboard, "B650 Tomahawk WiFi")
            .with_brand("MSI")
            .with_price(1_249_500)
            .with_stock(5)
            .with_socket("AM5")
            .with_ram_type("DDR5")
            .with_spec("Form Factor", "ATX")
            .with_spec("M.2 Slots", "2x Gen4"),
        PartRecord::new("mobo-b760m-btf", Category::Motherboard, "B760M Project Zero")
            .with_brand("MSI")
            .with_price(1_099_500)
            .with_stock(3)
            .with_socket("LGA1700")
            .with_ram_type("DDR5")
            .with_spec("Form Factor", "Micro ATX")
            .with_spec("Design", "Back-connect")
            .with_spec("M.2 Slots", "2"),
        PartRecord::new("ram-ddr5-32", Category::Ram, "Fury Beast 32GB (2x16GB) DDR5-6000")
            .with_brand("Kingston")
            .with_price(649_500)
            .with_stock(25)
            .with_wattage(10.0),
        PartRecord::new("ram-ddr4-16", Category::Ram, "Vengeance LPX 16GB DDR4-3200")
            .with_brand("Corsair")
            .with_price(229_500)
            .with_stock(30)
            .with_wattage(6.0),
        PartRecord::new("ssd-990pro", Category::Storage, "990 Pro 2TB NVMe")
            .with_brand("Samsung")
            .with_price(949_500)
            .with_stock(10)
            .with_wattage(8.0),
        PartRecord::new("ssd-sn770", Category::Storage, "WD Black SN770 1TB")
            .with_brand("Western Digital")
            .with_price(449_500)
            .with_stock(0)
            .with_wattage(6.0),
        PartRecord::new("psu-rm850x", Category::Psu, "RM850x 850W Gold")
            .with_brand("Corsair")
            .with_price(749_500)
            .with_stock(8),
        PartRecord::new("psu-550", Category::Psu, "MWE Bronze V2")
            .with_brand("Cooler Master")
            .with_price(299_500)
            .with_stock(14)
            .with_wattage(550.0),
        PartRecord::new("case-h5", Category::Case, "H5 Flow")
            .with_brand("NZXT")
            .with_price(549_500)
            .with_stock(7)
            .with_spec("Type", "ATX Mid Tower")
            .with_spec("Max GPU Length", "365")
            .with_spec("Max Radiator Size (mm)", "280"),
        PartRecord::new("case-nr200", Category::Case, "MasterBox NR200P")
            .with_brand("Cooler Master")
            .with_price(499_500)
            .with_stock(4)
            .with_spec("Mobo Support", "Mini-ITX")
            .with_spec("Max GPU Length", "330")
            .with_spec("Max Radiator Size (mm)", "280"),
        PartRecord::new("cooler-ak620", Category::Cooler, "AK620")
            .with_brand("DeepCool")
            .with_price(349_500)
            .with_stock(9)
            .with_wattage(260.0),
        PartRecord::new("cooler-kraken360", Category::Cooler, "Kraken 360 AIO Liquid Cooler")
            .with_brand("NZXT")
            .with_price(899_500)
            .with_stock(3)
            .with_wattage(300.0)
            .with_spec("Radiator Size", "360mm"),
    ];

    for part in &parts {
        db::upsert_part(conn, part)?;
    }

    println!("Loaded {} sample parts", parts.len());
    Ok(())
}
