//! Data models for PC parts, builds and analysis results

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Component slot in a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Cpu,
    Gpu,
    Motherboard,
    Ram,
    Storage,
    Psu,
    Case,
    Cooler,
}

impl Category {
    /// Every category a complete build needs, in display order.
    pub const ESSENTIAL: [Category; 8] = [
        Category::Cpu,
        Category::Gpu,
        Category::Motherboard,
        Category::Ram,
        Category::Storage,
        Category::Psu,
        Category::Case,
        Category::Cooler,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Cpu => "CPU",
            Category::Gpu => "GPU",
            Category::Motherboard => "Motherboard",
            Category::Ram => "RAM",
            Category::Storage => "Storage",
            Category::Psu => "PSU",
            Category::Case => "Case",
            Category::Cooler => "Cooler",
        }
    }

    /// Only storage accepts more than one part per build.
    pub fn is_multi_slot(self) -> bool {
        matches!(self, Category::Storage)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s.trim().to_ascii_uppercase().as_str() {
            "CPU" | "PROCESSOR" => Category::Cpu,
            "GPU" | "GRAPHICS CARD" | "VIDEO CARD" => Category::Gpu,
            "MOTHERBOARD" | "MOBO" => Category::Motherboard,
            "RAM" | "MEMORY" => Category::Ram,
            "STORAGE" | "SSD" => Category::Storage,
            "PSU" | "POWER SUPPLY" => Category::Psu,
            "CASE" | "CHASSIS" => Category::Case,
            "COOLER" | "CPU COOLER" => Category::Cooler,
            _ => return Err(CatalogError::UnknownCategory(s.to_string())),
        };
        Ok(category)
    }
}

/// Errors raised while turning catalog records into components
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown part category '{0}'")]
    UnknownCategory(String),

    #[error("part '{0}' has no model name")]
    MissingName(String),

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Ordered specification sheet. Keys are free-form and compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specifications(Vec<(String, String)>);

impl Specifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    /// First non-empty value among `keys`, in the order given.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Specifications {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Specifications {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpecVisitor;

        impl<'de> Visitor<'de> for SpecVisitor {
            type Value = Specifications;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of specification names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut specs = Specifications::new();
                while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
                    let value = match value {
                        serde_json::Value::Null => continue,
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    specs.insert(key, value);
                }
                Ok(specs)
            }
        }

        deserializer.deserialize_map(SpecVisitor)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// Raw part record as stored in the catalog or sent by the storefront.
///
/// The catalog shape (`name`, `stock`) and the builder's component shape
/// (`model`, `ramType`, `performanceScore`, ...) deserialize into the same type.
/// Prices are in minor units (centavos).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartRecord {
    pub id: String,
    pub category: String,
    #[serde(alias = "model")]
    pub name: String,
    pub brand: Option<String>,
    pub price: u64,
    pub stock: Option<u32>,
    pub wattage: Option<f64>,
    pub socket: Option<String>,
    pub ram_type: Option<String>,
    pub performance_score: Option<f64>,
    pub performance_tier: Option<i64>,
    pub dimensions: Option<Dimensions>,
    pub specifications: Specifications,
}

impl PartRecord {
    pub fn new(id: &str, category: Category, name: &str) -> Self {
        Self {
            id: id.to_string(),
            category: category.label().to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = Some(brand.to_string());
        self
    }

    pub fn with_price(mut self, minor_units: u64) -> Self {
        self.price = minor_units;
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn with_wattage(mut self, watts: f64) -> Self {
        self.wattage = Some(watts);
        self
    }

    pub fn with_socket(mut self, socket: &str) -> Self {
        self.socket = Some(socket.to_string());
        self
    }

    pub fn with_ram_type(mut self, ram_type: &str) -> Self {
        self.ram_type = Some(ram_type.to_string());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.performance_score = Some(score);
        self
    }

    pub fn with_tier(mut self, tier: i64) -> Self {
        self.performance_tier = Some(tier);
        self
    }

    pub fn with_dimensions(mut self, width: f64, height: f64, depth: f64) -> Self {
        self.dimensions = Some(Dimensions {
            width,
            height,
            depth,
        });
        self
    }

    pub fn with_spec(mut self, key: &str, value: &str) -> Self {
        self.specifications.insert(key, value);
        self
    }
}

/// Motherboard size class, ordered smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormFactor {
    Itx,
    MicroAtx,
    Atx,
    ExtendedAtx,
}

impl fmt::Display for FormFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormFactor::Itx => "Mini-ITX",
            FormFactor::MicroAtx => "Micro-ATX",
            FormFactor::Atx => "ATX",
            FormFactor::ExtendedAtx => "E-ATX",
        })
    }
}

/// Canonical component consumed by the rule engine.
///
/// Produced only by [`Component::from_record`]; the category decides which of
/// the optional fields are populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: String,
    pub category: Category,
    pub model: String,
    pub brand: Option<String>,
    pub price: u64,
    pub stock: Option<u32>,
    /// Power draw for consumers, thermal rating for coolers, supply capacity for PSUs.
    pub wattage: Option<f64>,
    pub performance_score: Option<f64>,
    pub performance_tier: Option<i64>,
    pub socket: Option<String>,
    /// Uppercased memory generation (RAM kit type, board or CPU support).
    pub memory_type: Option<String>,
    pub gpu_length_mm: Option<f64>,
    pub max_gpu_length_mm: Option<f64>,
    pub m2_slots: Option<u32>,
    pub radiator_mm: Option<u32>,
    pub max_radiator_mm: Option<u32>,
    pub form_factor: Option<FormFactor>,
    /// Largest board the case accepts.
    pub max_board: Option<FormFactor>,
    /// Motherboard: connectors on the rear. Case: has the matching cutouts.
    pub back_connect: bool,
    pub liquid: bool,
    pub psu_capacity: Option<f64>,
    pub specifications: Specifications,
}

/// A build snapshot: category to selected parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Build {
    slots: BTreeMap<Category, Vec<Component>>,
}

impl Build {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a part. Single-slot categories replace their current part.
    pub fn select(&mut self, component: Component) {
        let slot = self.slots.entry(component.category).or_default();
        if !component.category.is_multi_slot() {
            slot.clear();
        }
        slot.push(component);
    }

    #[cfg(test)]
    pub fn with(mut self, component: Component) -> Self {
        self.select(component);
        self
    }

    pub fn get(&self, category: Category) -> Option<&Component> {
        self.parts(category).first()
    }

    pub fn parts(&self, category: Category) -> &[Component] {
        self.slots.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.slots.values().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Should block purchase.
    Error,
    /// Advisory only.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityIssue {
    pub severity: Severity,
    pub message: String,
    pub component_a: Category,
    pub component_b: Option<Category>,
}

impl CompatibilityIssue {
    pub fn error(message: String, a: Category, b: Option<Category>) -> Self {
        Self {
            severity: Severity::Error,
            message,
            component_a: a,
            component_b: b,
        }
    }

    pub fn warning(message: String, a: Category, b: Option<Category>) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            component_a: a,
            component_b: b,
        }
    }

    pub fn involves(&self, category: Category) -> bool {
        self.component_a == category || self.component_b == Some(category)
    }
}

impl fmt::Display for CompatibilityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    P1080,
    #[default]
    P1440,
    Uhd4k,
}

impl Resolution {
    pub fn label(self) -> &'static str {
        match self {
            Resolution::P1080 => "1080p",
            Resolution::P1440 => "1440p",
            Resolution::Uhd4k => "4K",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown resolution '{0}' (expected 1080p, 1440p or 4K)")]
pub struct ParseResolutionError(String);

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1080p" | "1080" => Ok(Resolution::P1080),
            "1440p" | "1440" => Ok(Resolution::P1440),
            "4k" | "2160p" | "2160" => Ok(Resolution::Uhd4k),
            _ => Err(ParseResolutionError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BottleneckStatus {
    Balanced,
    SlightMismatch,
    SevereMismatch,
    Incomplete,
}

impl fmt::Display for BottleneckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BottleneckStatus::Balanced => "Balanced",
            BottleneckStatus::SlightMismatch => "Slight Mismatch",
            BottleneckStatus::SevereMismatch => "Severe Mismatch",
            BottleneckStatus::Incomplete => "Incomplete",
        })
    }
}

/// Display tone for a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Ok,
    Warn,
    Error,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BottleneckResult {
    pub status: BottleneckStatus,
    pub message: String,
    pub tone: Tone,
}

impl fmt::Display for BottleneckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub label: &'static str,
    pub average: u32,
    pub lows: u32,
}

/// Synthetic frame-rate estimate; not a measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpsEstimate {
    pub average_fps: u32,
    pub chart: Vec<ChartPoint>,
}

impl fmt::Display for FpsEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average: {} fps", self.average_fps)?;
        for point in &self.chart {
            writeln!(
                f,
                "  {:>5}: {:>4} avg {:>4} lows",
                point.label, point.average, point.lows
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn component(record: PartRecord) -> Component {
    Component::from_record(&record).expect("valid test record")
}
