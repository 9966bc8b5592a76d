//! Build totals and the plain-text context handed to the build advisor

use std::fmt;

use crate::compatibility::total_draw;
use crate::models::{BottleneckResult, Build, Category, CompatibilityIssue, Component};

/// Summary of a build's cost, power budget and completeness
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    pub lines: Vec<(Category, Vec<String>)>,
    pub total_price: u64,
    pub total_draw: f64,
    pub psu_capacity: Option<f64>,
    pub missing: Vec<Category>,
}

impl BuildSummary {
    /// PSU load as a percentage of capacity, when the capacity is known.
    pub fn load_percent(&self) -> Option<f64> {
        self.psu_capacity
            .filter(|cap| *cap > 0.0)
            .map(|cap| self.total_draw / cap * 100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Format minor units as pesos, e.g. `PHP 12,499.50`.
pub fn format_price(minor_units: u64) -> String {
    let whole = (minor_units / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("PHP {}.{:02}", grouped, minor_units % 100)
}

fn describe(component: &Component) -> String {
    match &component.brand {
        Some(brand) if !component.model.starts_with(brand.as_str()) => {
            format!("{} {} ({})", brand, component.model, format_price(component.price))
        }
        _ => format!("{} ({})", component.model, format_price(component.price)),
    }
}

pub fn summarize(build: &Build) -> BuildSummary {
    let lines = Category::ESSENTIAL
        .iter()
        .map(|category| {
            let parts = build.parts(*category).iter().map(describe).collect();
            (*category, parts)
        })
        .collect();

    BuildSummary {
        lines,
        total_price: build.components().map(|c| c.price).sum(),
        total_draw: total_draw(build),
        psu_capacity: build.get(Category::Psu).and_then(|psu| psu.psu_capacity),
        missing: Category::ESSENTIAL
            .into_iter()
            .filter(|category| build.parts(*category).is_empty())
            .collect(),
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Build Summary ===")?;
        for (category, parts) in &self.lines {
            if parts.is_empty() {
                writeln!(f, "  {:<12} -", category.label())?;
            }
            for part in parts {
                writeln!(f, "  {:<12} {}", category.label(), part)?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Total price: {}", format_price(self.total_price))?;
        match (self.psu_capacity, self.load_percent()) {
            (Some(cap), Some(load)) => writeln!(
                f,
                "Power: {:.0}W of {:.0}W ({:.0}% load)",
                self.total_draw, cap, load
            )?,
            _ => writeln!(f, "Power: {:.0}W (no PSU capacity known)", self.total_draw)?,
        }
        if !self.is_complete() {
            let missing: Vec<&str> = self.missing.iter().map(|c| c.label()).collect();
            writeln!(f, "Missing: {}", missing.join(", "))?;
        }
        Ok(())
    }
}

/// Build listing plus the deterministic analysis, as plain text for the advisor.
pub fn advisor_context(
    build: &Build,
    issues: &[CompatibilityIssue],
    bottleneck: &BottleneckResult,
) -> String {
    let mut out = String::from("Current Build:\n");
    for (category, parts) in summarize(build).lines {
        if parts.is_empty() {
            out.push_str(&format!("{}: None selected\n", category));
        } else {
            out.push_str(&format!("{}: {}\n", category, parts.join(", ")));
        }
    }

    let issue_text = if issues.is_empty() {
        "None detected".to_string()
    } else {
        issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    };

    out.push_str("\nDETERMINISTIC ANALYSIS RESULTS:\n");
    out.push_str(&format!("- Bottleneck Status: {}\n", bottleneck.status));
    out.push_str(&format!("- Bottleneck Message: {}\n", bottleneck.message));
    out.push_str(&format!("- Compatibility Issues: {}\n", issue_text));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bottleneck::calculate_bottleneck;
    use crate::compatibility::check_compatibility;
    use crate::models::{PartRecord, Resolution, component};

    fn sample_build() -> Build {
        Build::new()
            .with(component(
                PartRecord::new("cpu", Category::Cpu, "Ryzen 5 7600")
                    .with_brand("AMD")
                    .with_price(1_199_500)
                    .with_wattage(65.0),
            ))
            .with(component(
                PartRecord::new("gpu", Category::Gpu, "RTX 4060")
                    .with_brand("NVIDIA")
                    .with_price(1_850_000)
                    .with_wattage(115.0),
            ))
            .with(component(
                PartRecord::new("psu", Category::Psu, "MWE 550W Bronze").with_price(320_000),
            ))
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(0), "PHP 0.00");
        assert_eq!(format_price(99_950), "PHP 999.50");
        assert_eq!(format_price(1_249_900), "PHP 12,499.00");
        assert_eq!(format_price(123_456_789), "PHP 1,234,567.89");
    }

    #[test]
    fn totals_exclude_psu_from_draw() {
        let summary = summarize(&sample_build());
        assert_eq!(summary.total_price, 3_369_500);
        assert_eq!(summary.total_draw, 180.0);
        assert_eq!(summary.psu_capacity, Some(550.0));
        let load = summary.load_percent().unwrap();
        assert!((load - 32.727).abs() < 0.01);
    }

    #[test]
    fn missing_categories_in_display_order() {
        let summary = summarize(&sample_build());
        assert!(!summary.is_complete());
        assert_eq!(
            summary.missing,
            vec![Category::Motherboard, Category::Ram, Category::Storage, Category::Case, Category::Cooler]
        );
        assert!(summarize(&Build::new()).missing.len() == 8);
    }

    #[test]
    fn advisor_context_lists_parts_and_analysis() {
        let build = sample_build();
        let issues = check_compatibility(&build);
        let bottleneck = calculate_bottleneck(&build, Resolution::P1440);
        let context = advisor_context(&build, &issues, &bottleneck);

        assert!(context.contains("CPU: AMD Ryzen 5 7600 (PHP 11,995.00)"));
        assert!(context.contains("Motherboard: None selected"));
        assert!(context.contains("- Bottleneck Status: Balanced"));
        assert!(context.contains("- Compatibility Issues: None detected"));
    }

    #[test]
    fn advisor_context_tags_issue_severity() {
        let build = sample_build().with(component(
            PartRecord::new("gpu", Category::Gpu, "RTX 4090").with_wattage(450.0),
        ));
        let issues = check_compatibility(&build);
        let bottleneck = calculate_bottleneck(&build, Resolution::P1440);
        let context = advisor_context(&build, &issues, &bottleneck);
        assert!(context.contains("[ERROR] Insufficient power"));
    }
}
