//! Build compatibility rules
//!
//! [`check_compatibility`] evaluates every rule against a build snapshot and
//! returns the issues in rule order. A rule whose inputs are missing or
//! unparseable reports nothing: lack of data never counts as a failure.
//!
//! [`check_addition`] is the narrower gate used when a part is added: only the
//! socket and memory-type rules run, and only their errors block the add.

use log::debug;

use crate::models::{Build, Category, CompatibilityIssue, Component, Severity};

/// Draw above this share of PSU capacity is an error.
const PSU_ERROR_LOAD: f64 = 0.80;
/// Draw above this share of PSU capacity is a warning.
const PSU_WARN_LOAD: f64 = 0.65;
/// Capacity suggested when the PSU is undersized, relative to draw.
const PSU_SUGGESTED_MARGIN: f64 = 1.25;

type Rule = fn(&Build, &mut Vec<CompatibilityIssue>);

const RULES: &[(&str, Rule)] = &[
    ("socket", check_socket),
    ("memory type", check_memory_type),
    ("psu headroom", check_psu_headroom),
    ("gpu clearance", check_gpu_clearance),
    ("cooler rating", check_cooler_rating),
    ("back-connect", check_back_connect),
    ("storage slots", check_storage_slots),
    ("radiator size", check_radiator_size),
    ("form factor", check_form_factor),
];

/// Run every compatibility rule against `build`.
pub fn check_compatibility(build: &Build) -> Vec<CompatibilityIssue> {
    let mut issues = Vec::new();
    for (name, rule) in RULES {
        let before = issues.len();
        rule(build, &mut issues);
        if issues.len() > before {
            debug!("rule '{}' reported {} issue(s)", name, issues.len() - before);
        }
    }
    issues
}

/// Hard conflicts `candidate` would introduce if added to `build`.
pub fn check_addition(build: &Build, candidate: &Component) -> Vec<CompatibilityIssue> {
    let mut trial = build.clone();
    trial.select(candidate.clone());

    let mut issues = Vec::new();
    check_socket(&trial, &mut issues);
    check_memory_type(&trial, &mut issues);
    issues.retain(|issue| issue.involves(candidate.category));
    issues
}

/// Why a part could not be added to a build
#[derive(Debug, thiserror::Error)]
pub enum AddError {
    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error("{}", .0.message)]
    Incompatible(CompatibilityIssue),
}

impl Build {
    /// Select `candidate` unless it is out of stock or conflicts with the build.
    pub fn try_select(&mut self, candidate: Component) -> Result<(), AddError> {
        if candidate.stock == Some(0) {
            return Err(AddError::OutOfStock(candidate.model));
        }
        if let Some(conflict) = check_addition(self, &candidate)
            .into_iter()
            .find(|issue| issue.severity == Severity::Error)
        {
            return Err(AddError::Incompatible(conflict));
        }
        self.select(candidate);
        Ok(())
    }
}

/// Comparable socket name; placeholders such as "-" normalize to nothing.
fn socket_key(raw: &str) -> Option<String> {
    let key = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();
    (!key.is_empty()).then_some(key)
}

fn check_socket(build: &Build, issues: &mut Vec<CompatibilityIssue>) {
    let (Some(cpu), Some(board)) = (build.get(Category::Cpu), build.get(Category::Motherboard))
    else {
        return;
    };
    let (Some(cpu_socket), Some(board_socket)) = (&cpu.socket, &board.socket) else {
        return;
    };
    let (Some(cpu_key), Some(board_key)) = (socket_key(cpu_socket), socket_key(board_socket))
    else {
        return;
    };
    if cpu_key != board_key {
        issues.push(CompatibilityIssue::error(
            format!(
                "Socket mismatch: {} uses {} but {} has a {} socket.",
                cpu.model, cpu_socket, board.model, board_socket
            ),
            Category::Cpu,
            Some(Category::Motherboard),
        ));
    }
}

/// Memory types match when either names the other ("DDR5" vs "DDR5-6000").
fn memory_types_match(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

fn check_memory_type(build: &Build, issues: &mut Vec<CompatibilityIssue>) {
    let kits = build.parts(Category::Ram);

    if let Some(board) = build.get(Category::Motherboard) {
        if let Some(supported) = &board.memory_type {
            for kit in kits {
                let Some(kit_type) = &kit.memory_type else {
                    continue;
                };
                if !memory_types_match(supported, kit_type) {
                    issues.push(CompatibilityIssue::error(
                        format!(
                            "RAM type mismatch: {} supports {} but {} is {}.",
                            board.model, supported, kit.model, kit_type
                        ),
                        Category::Motherboard,
                        Some(Category::Ram),
                    ));
                }
            }
        }
    }

    if let Some(cpu) = build.get(Category::Cpu) {
        if let Some(supported) = &cpu.memory_type {
            for kit in kits {
                let Some(kit_type) = &kit.memory_type else {
                    continue;
                };
                if !memory_types_match(supported, kit_type) {
                    issues.push(CompatibilityIssue::error(
                        format!(
                            "RAM type mismatch: {} supports {} but {} is {}.",
                            cpu.model, supported, kit.model, kit_type
                        ),
                        Category::Cpu,
                        Some(Category::Ram),
                    ));
                }
            }
        }
    }
}

/// Combined draw of every selected part except the PSU.
pub fn total_draw(build: &Build) -> f64 {
    build
        .components()
        .filter(|c| c.category != Category::Psu)
        .filter_map(|c| c.wattage)
        .sum()
}

fn check_psu_headroom(build: &Build, issues: &mut Vec<CompatibilityIssue>) {
    let Some(psu) = build.get(Category::Psu) else {
        return;
    };
    let Some(capacity) = psu.psu_capacity else {
        return;
    };
    let draw = total_draw(build);

    if draw > capacity * PSU_ERROR_LOAD {
        issues.push(CompatibilityIssue::error(
            format!(
                "Insufficient power: estimated draw of {:.0}W leaves less than 20% headroom on {} ({:.0}W). Choose a PSU of at least {:.0}W.",
                draw,
                psu.model,
                capacity,
                (draw * PSU_SUGGESTED_MARGIN).ceil()
            ),
            Category::Psu,
            None,
        ));
    } else if draw > capacity * PSU_WARN_LOAD {
        issues.push(CompatibilityIssue::warning(
            format!(
                "Power headroom: estimated draw of {:.0}W is over 65% of {} capacity ({:.0}W). Consider a higher wattage PSU for efficiency and future upgrades.",
                draw, psu.model, capacity
            ),
            Category::Psu,
            None,
        ));
    }
}

fn check_gpu_clearance(build: &Build, issues: &mut Vec<CompatibilityIssue>) {
    let (Some(gpu), Some(case)) = (build.get(Category::Gpu), build.get(Category::Case)) else {
        return;
    };
    let (Some(length), Some(max)) = (gpu.gpu_length_mm, case.max_gpu_length_mm) else {
        return;
    };
    if length > max {
        issues.push(CompatibilityIssue::error(
            format!(
                "GPU length: {} ({}mm) may not fit in {} (max {}mm).",
                gpu.model, length, case.model, max
            ),
            Category::Case,
            Some(Category::Gpu),
        ));
    }
}

fn check_cooler_rating(build: &Build, issues: &mut Vec<CompatibilityIssue>) {
    let (Some(cpu), Some(cooler)) = (build.get(Category::Cpu), build.get(Category::Cooler)) else {
        return;
    };
    let tdp = cpu.wattage.unwrap_or(0.0);
    let rating = cooler.wattage.unwrap_or(0.0);
    if tdp > 0.0 && rating > 0.0 && rating < tdp {
        issues.push(CompatibilityIssue::error(
            format!(
                "Cooler rating: {} is rated for {:.0}W but {} has a {:.0}W TDP.",
                cooler.model, rating, cpu.model, tdp
            ),
            Category::Cooler,
            Some(Category::Cpu),
        ));
    }
}

fn check_back_connect(build: &Build, issues: &mut Vec<CompatibilityIssue>) {
    let (Some(board), Some(case)) = (build.get(Category::Motherboard), build.get(Category::Case))
    else {
        return;
    };
    // Support can only be left unconfirmed, never disproven.
    if board.back_connect && !case.back_connect {
        issues.push(CompatibilityIssue::warning(
            format!(
                "Back-connect motherboard: {} routes its connectors to the rear, but {} does not list back-connect cutout support.",
                board.model, case.model
            ),
            Category::Motherboard,
            Some(Category::Case),
        ));
    }
}

fn check_storage_slots(build: &Build, issues: &mut Vec<CompatibilityIssue>) {
    let drives = build.parts(Category::Storage).len();
    if drives <= 1 {
        return;
    }
    let board = build.get(Category::Motherboard);

    if let Some((board, slots)) = board.and_then(|b| b.m2_slots.map(|s| (b, s))) {
        if drives > slots as usize {
            issues.push(CompatibilityIssue::error(
                format!(
                    "Storage slots: {} drives selected but {} has only {} M.2 slot(s).",
                    drives, board.model, slots
                ),
                Category::Storage,
                Some(Category::Motherboard),
            ));
        }
    }

    // Reported alongside the slot error as well; see DESIGN.md.
    issues.push(CompatibilityIssue::warning(
        format!(
            "Multiple drives: {} storage devices may share PCIe lanes with other slots. Check the motherboard manual.",
            drives
        ),
        Category::Storage,
        board.map(|b| b.category),
    ));
}

fn check_radiator_size(build: &Build, issues: &mut Vec<CompatibilityIssue>) {
    let (Some(cooler), Some(case)) = (build.get(Category::Cooler), build.get(Category::Case))
    else {
        return;
    };
    let radiator = cooler.radiator_mm.unwrap_or(0);
    let is_aio = cooler.liquid || radiator > 0;
    let Some(max) = case.max_radiator_mm else {
        return;
    };
    if is_aio && radiator > max {
        issues.push(CompatibilityIssue::error(
            format!(
                "Radiator size: {} uses a {}mm radiator but {} supports at most {}mm.",
                cooler.model, radiator, case.model, max
            ),
            Category::Cooler,
            Some(Category::Case),
        ));
    }
}

fn check_form_factor(build: &Build, issues: &mut Vec<CompatibilityIssue>) {
    let (Some(board), Some(case)) = (build.get(Category::Motherboard), build.get(Category::Case))
    else {
        return;
    };
    let (Some(size), Some(largest)) = (board.form_factor, case.max_board) else {
        return;
    };
    if size > largest {
        issues.push(CompatibilityIssue::error(
            format!(
                "Form factor: {} is {} but {} supports up to {}.",
                board.model, size, case.model, largest
            ),
            Category::Motherboard,
            Some(Category::Case),
        ));
    }
}
