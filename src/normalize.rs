//! Catalog ingestion boundary
//!
//! Part records carry free-form specification sheets whose key names vary from
//! one vendor (and one data-entry session) to the next. All of that tolerance
//! lives here: a [`PartRecord`] goes in, a [`Component`] with typed canonical
//! fields comes out, and the rule engine never looks at raw keys again.

use regex::Regex;

use crate::models::{CatalogError, Category, Component, FormFactor, PartRecord, Specifications};

const SOCKET_KEYS: &[&str] = &["Socket", "CPU Socket", "Socket Support"];
const BOARD_MEMORY_KEYS: &[&str] = &["Memory Type", "RAM Type", "Memory"];
const KIT_MEMORY_KEYS: &[&str] = &["Type", "Memory Type"];
const CPU_MEMORY_KEYS: &[&str] = &["Memory Type", "Supported Memory"];
const GPU_LENGTH_KEYS: &[&str] = &["Length (Depth) (mm)"];
const CASE_GPU_KEYS: &[&str] = &["Max GPU Length"];
const M2_SLOT_KEYS: &[&str] = &["M.2 Slots", "M2 Slots"];
const RADIATOR_KEYS: &[&str] = &["Radiator Size"];
const CASE_RADIATOR_KEYS: &[&str] = &["Max Radiator Size (mm)"];

const CUTOUT_KEY: &str = "Back-Connect Cutout";
const BOARD_BACK_CONNECT_MARKERS: &[&str] = &["BTF", "PROJECT STEALTH", "BACK-CONNECT"];
const CASE_BACK_CONNECT_MARKERS: &[&str] =
    &["BTF", "PROJECT STEALTH", "BACK-CONNECT", "HIDDEN CONNECTOR"];

impl Component {
    /// Resolve a raw record into the canonical form the rules read.
    ///
    /// Unparseable numeric specs become `None` so that the rules depending on
    /// them stay silent; only an unknown category or a nameless part is rejected.
    pub fn from_record(record: &PartRecord) -> Result<Self, CatalogError> {
        let category: Category = record.category.parse()?;
        let model = record.name.trim().to_string();
        if model.is_empty() {
            return Err(CatalogError::MissingName(record.id.clone()));
        }
        let specs = &record.specifications;
        let dims = record.dimensions.unwrap_or_default();

        let mut component = Component {
            id: record.id.clone(),
            category,
            model,
            brand: record.brand.clone().filter(|b| !b.trim().is_empty()),
            price: record.price,
            stock: record.stock,
            wattage: record.wattage.filter(|w| w.is_finite() && *w >= 0.0),
            performance_score: record.performance_score.filter(|s| s.is_finite()),
            performance_tier: record.performance_tier,
            socket: None,
            memory_type: None,
            gpu_length_mm: None,
            max_gpu_length_mm: None,
            m2_slots: None,
            radiator_mm: None,
            max_radiator_mm: None,
            form_factor: None,
            max_board: None,
            back_connect: false,
            liquid: false,
            psu_capacity: None,
            specifications: specs.clone(),
        };

        match category {
            Category::Cpu => {
                component.socket = socket(record);
                component.memory_type = specs.first_of(CPU_MEMORY_KEYS).map(str::to_uppercase);
            }
            Category::Motherboard => {
                component.socket = socket(record);
                component.memory_type = non_empty(record.ram_type.as_deref())
                    .or_else(|| specs.first_of(BOARD_MEMORY_KEYS))
                    .map(str::to_uppercase);
                component.m2_slots = specs.first_of(M2_SLOT_KEYS).and_then(leading_integer);
                component.form_factor = specs.get("Form Factor").and_then(first_form_factor);
                component.back_connect =
                    mentions_any(&component.model, specs, BOARD_BACK_CONNECT_MARKERS);
            }
            Category::Ram => {
                component.memory_type = non_empty(record.ram_type.as_deref())
                    .or_else(|| specs.first_of(KIT_MEMORY_KEYS))
                    .map(str::to_uppercase)
                    .or_else(|| memory_generation_in(&component.model));
            }
            Category::Gpu => {
                component.gpu_length_mm = specs
                    .first_of(GPU_LENGTH_KEYS)
                    .and_then(leading_number)
                    .or_else(|| positive(dims.depth))
                    .or_else(|| positive(dims.width));
            }
            Category::Case => {
                component.max_gpu_length_mm = specs
                    .first_of(CASE_GPU_KEYS)
                    .and_then(leading_number)
                    .or_else(|| positive(dims.depth));
                component.max_radiator_mm =
                    specs.first_of(CASE_RADIATOR_KEYS).and_then(leading_integer);
                component.max_board = largest_supported_board(specs);
                component.back_connect =
                    mentions_any(&component.model, specs, CASE_BACK_CONNECT_MARKERS)
                        || specs
                            .get(CUTOUT_KEY)
                            .is_some_and(|value| value.trim().eq_ignore_ascii_case("yes"));
            }
            Category::Cooler => {
                component.radiator_mm = specs.first_of(RADIATOR_KEYS).and_then(leading_integer);
                let lower = component.model.to_lowercase();
                component.liquid = lower.contains("aio") || lower.contains("liquid");
            }
            Category::Psu => {
                component.psu_capacity = match component.wattage.filter(|w| *w > 0.0) {
                    Some(watts) => Some(watts),
                    None => wattage_in_name(&component.model)?,
                };
            }
            Category::Storage => {}
        }

        Ok(component)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn socket(record: &PartRecord) -> Option<String> {
    non_empty(record.socket.as_deref())
        .or_else(|| record.specifications.first_of(SOCKET_KEYS))
        .map(|s| s.trim().to_string())
}

fn memory_generation_in(model: &str) -> Option<String> {
    let upper = model.to_uppercase();
    ["DDR5", "DDR4"]
        .into_iter()
        .find(|generation| upper.contains(generation))
        .map(str::to_string)
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Leading integer of a spec value ("3x Gen4" -> 3, "360mm" -> 360). Zero counts as absent.
pub fn leading_integer(value: &str) -> Option<u32> {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Leading decimal number of a spec value ("336.5 mm" -> 336.5). Must be positive.
pub fn leading_number(value: &str) -> Option<f64> {
    let mut seen_dot = false;
    let number: String = value
        .trim_start()
        .chars()
        .take_while(|c| {
            if *c == '.' && !seen_dot {
                seen_dot = true;
                true
            } else {
                c.is_ascii_digit()
            }
        })
        .collect();
    number.parse::<f64>().ok().and_then(positive)
}

/// PSU capacity taken from a model name such as "RM850x 850W".
fn wattage_in_name(model: &str) -> Result<Option<f64>, CatalogError> {
    let re = Regex::new(r"(?i)(\d+)W")?;
    Ok(re
        .captures(model)
        .and_then(|cap| cap[1].parse::<f64>().ok())
        .and_then(positive))
}

/// Case-insensitive substring search over the model name and the spec sheet.
///
/// The cutout entry is left out: its key names a marker whatever its value says.
fn mentions_any(model: &str, specs: &Specifications, markers: &[&str]) -> bool {
    let haystack = std::iter::once(model)
        .chain(
            specs
                .iter()
                .filter(|(key, _)| !key.eq_ignore_ascii_case(CUTOUT_KEY))
                .flat_map(|(key, value)| [key, value]),
        )
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    markers.iter().any(|marker| haystack.contains(marker))
}

fn form_factor_tokens(raw: &str) -> Vec<FormFactor> {
    let text = raw
        .to_uppercase()
        .replace("MICRO-ATX", "M-ATX")
        .replace("MICRO ATX", "M-ATX")
        .replace("MICROATX", "M-ATX")
        .replace("MINI-ITX", "ITX")
        .replace("MINI ITX", "ITX")
        .replace("MINIITX", "ITX")
        .replace("EXTENDED-ATX", "E-ATX")
        .replace("EXTENDED ATX", "E-ATX")
        .replace("E ATX", "E-ATX");

    text.split(|c: char| c.is_whitespace() || c == ',' || c == '/' || c == ';')
        .filter_map(|token| match token {
            "ITX" => Some(FormFactor::Itx),
            "M-ATX" | "MATX" => Some(FormFactor::MicroAtx),
            "ATX" => Some(FormFactor::Atx),
            "E-ATX" | "EATX" => Some(FormFactor::ExtendedAtx),
            _ => None,
        })
        .collect()
}

/// Form factor named by a spec value such as "Micro ATX" or "E-ATX".
pub fn first_form_factor(raw: &str) -> Option<FormFactor> {
    form_factor_tokens(raw).into_iter().next()
}

/// `Mobo Support` lists sizes explicitly; a `Type` like "ATX Mid Tower" covers that size and smaller.
fn largest_supported_board(specs: &Specifications) -> Option<FormFactor> {
    let listed = specs
        .get("Mobo Support")
        .map(form_factor_tokens)
        .unwrap_or_default();
    let by_type = specs.get("Type").and_then(first_form_factor);
    listed.into_iter().chain(by_type).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(record: PartRecord) -> Component {
        Component::from_record(&record).unwrap()
    }

    #[test]
    fn socket_prefers_field_then_spec_variants() {
        let cpu = normalize(
            PartRecord::new("c", Category::Cpu, "Ryzen 7 7700X").with_spec("CPU Socket", " AM5 "),
        );
        assert_eq!(cpu.socket.as_deref(), Some("AM5"));

        let board = normalize(
            PartRecord::new("m", Category::Motherboard, "B650")
                .with_socket("am5")
                .with_spec("Socket", "LGA1700"),
        );
        assert_eq!(board.socket.as_deref(), Some("am5"));
    }

    #[test]
    fn memory_type_resolution_depends_on_category() {
        let kit = normalize(PartRecord::new("r", Category::Ram, "Vengeance 32GB DDR5-6000"));
        assert_eq!(kit.memory_type.as_deref(), Some("DDR5"));

        let board = normalize(
            PartRecord::new("m", Category::Motherboard, "B760").with_spec("RAM Type", "ddr4"),
        );
        assert_eq!(board.memory_type.as_deref(), Some("DDR4"));

        // CPUs only declare memory support through their spec sheet.
        let cpu = normalize(PartRecord::new("c", Category::Cpu, "Core i5").with_ram_type("DDR5"));
        assert_eq!(cpu.memory_type, None);
    }

    #[test]
    fn psu_capacity_falls_back_to_model_name() {
        let named = normalize(PartRecord::new("p", Category::Psu, "Corsair RM850x 850w Gold"));
        assert_eq!(named.psu_capacity, Some(850.0));

        let explicit =
            normalize(PartRecord::new("p", Category::Psu, "Focus 750W").with_wattage(650.0));
        assert_eq!(explicit.psu_capacity, Some(650.0));

        let unknown = normalize(PartRecord::new("p", Category::Psu, "Mystery Supply"));
        assert_eq!(unknown.psu_capacity, None);
    }

    #[test]
    fn numeric_specs_parse_leading_values() {
        assert_eq!(leading_integer("3x Gen4"), Some(3));
        assert_eq!(leading_integer("360mm"), Some(360));
        assert_eq!(leading_integer("none"), None);
        assert_eq!(leading_integer("0"), None);
        assert_eq!(leading_number("336.5 mm"), Some(336.5));
        assert_eq!(leading_number("n/a"), None);
    }

    #[test]
    fn gpu_length_uses_spec_then_dimensions() {
        let spec = normalize(
            PartRecord::new("g", Category::Gpu, "RTX 4080")
                .with_spec("Length (Depth) (mm)", "310")
                .with_dimensions(140.0, 60.0, 999.0),
        );
        assert_eq!(spec.gpu_length_mm, Some(310.0));

        let dims = normalize(
            PartRecord::new("g", Category::Gpu, "RTX 4060").with_dimensions(240.0, 40.0, 0.0),
        );
        assert_eq!(dims.gpu_length_mm, Some(240.0));
    }

    #[test]
    fn form_factor_synonyms_normalize() {
        assert_eq!(first_form_factor("Micro ATX"), Some(FormFactor::MicroAtx));
        assert_eq!(first_form_factor("mATX"), Some(FormFactor::MicroAtx));
        assert_eq!(first_form_factor("Mini-ITX"), Some(FormFactor::Itx));
        assert_eq!(first_form_factor("EATX"), Some(FormFactor::ExtendedAtx));
        assert_eq!(first_form_factor("Extended ATX"), Some(FormFactor::ExtendedAtx));
        assert_eq!(first_form_factor("EXTENDED-ATX"), Some(FormFactor::ExtendedAtx));
        assert_eq!(first_form_factor("Proprietary"), None);
    }

    #[test]
    fn case_board_support_takes_largest_declared() {
        let listed = normalize(
            PartRecord::new("k", Category::Case, "H5 Flow").with_spec("Mobo Support", "ATX, M-ATX"),
        );
        assert_eq!(listed.max_board, Some(FormFactor::Atx));

        let typed = normalize(
            PartRecord::new("k", Category::Case, "Meshify").with_spec("Type", "E-ATX Full Tower"),
        );
        assert_eq!(typed.max_board, Some(FormFactor::ExtendedAtx));
    }

    #[test]
    fn back_connect_flags() {
        let board = normalize(PartRecord::new("m", Category::Motherboard, "B760M Project Stealth"));
        assert!(board.back_connect);

        let case = normalize(
            PartRecord::new("k", Category::Case, "Plain Case").with_spec("Back-Connect Cutout", "Yes"),
        );
        assert!(case.back_connect);

        let named = normalize(
            PartRecord::new("k", Category::Case, "BTF Ready Case")
                .with_spec("Back-Connect Cutout", "No"),
        );
        assert!(named.back_connect);

        let declined = normalize(
            PartRecord::new("k", Category::Case, "Plain Case").with_spec("Back-Connect Cutout", "No"),
        );
        assert!(!declined.back_connect);

        let by_key = normalize(
            PartRecord::new("m", Category::Motherboard, "B650M Gaming").with_spec("Back-Connect", "Yes"),
        );
        assert!(by_key.back_connect);
    }

    #[test]
    fn unknown_category_and_missing_name_are_rejected() {
        let mut record = PartRecord::new("x", Category::Cpu, "Something");
        record.category = "Monitor".to_string();
        assert!(matches!(
            Component::from_record(&record),
            Err(CatalogError::UnknownCategory(_))
        ));

        let nameless = PartRecord::new("y", Category::Gpu, "  ");
        assert!(matches!(
            Component::from_record(&nameless),
            Err(CatalogError::MissingName(_))
        ));
    }
}
