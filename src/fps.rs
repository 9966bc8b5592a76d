//! Synthetic frame-rate estimate for the analytics chart

use rand::Rng;

use crate::models::{Build, Category, ChartPoint, FpsEstimate, Resolution};
use crate::tier::{Tier, tier};

/// Chart x-axis labels, left to right.
const CHART_LABELS: [&str; 5] = ["200", "400", "1000", "1300", "1600"];
const MIN_FPS: u32 = 10;

/// Baseline frame rate for a GPU tier at a resolution.
fn base_fps(gpu: Tier, resolution: Resolution) -> f64 {
    let row = match gpu.get() {
        4 => [240.0, 170.0, 100.0],
        3 => [160.0, 110.0, 60.0],
        2 => [110.0, 70.0, 40.0],
        _ => [60.0, 40.0, 25.0],
    };
    row[column(resolution)]
}

/// Share of frames lost to a CPU weaker than the GPU.
fn cpu_penalty(delta: i8, resolution: Resolution) -> f64 {
    let row = match delta {
        -1 => [0.10, 0.05, 0.0],
        -2 => [0.20, 0.12, 0.05],
        d if d <= -3 => [0.35, 0.20, 0.10],
        _ => return 0.0,
    };
    row[column(resolution)]
}

fn column(resolution: Resolution) -> usize {
    match resolution {
        Resolution::P1080 => 0,
        Resolution::P1440 => 1,
        Resolution::Uhd4k => 2,
    }
}

/// Average frame rate implied by the CPU and GPU tiers.
pub fn average_fps(cpu: Tier, gpu: Tier, resolution: Resolution) -> u32 {
    let penalty = cpu_penalty(cpu.delta(gpu), resolution);
    let fps = (base_fps(gpu, resolution) * (1.0 - penalty)).round() as u32;
    fps.max(MIN_FPS)
}

/// Estimate frame rates; `None` until both a CPU and a GPU are selected.
pub fn estimate_fps(build: &Build, resolution: Resolution) -> Option<FpsEstimate> {
    estimate_fps_with(build, resolution, &mut rand::thread_rng())
}

pub fn estimate_fps_with<R: Rng>(
    build: &Build,
    resolution: Resolution,
    rng: &mut R,
) -> Option<FpsEstimate> {
    let cpu = build.get(Category::Cpu)?;
    let gpu = build.get(Category::Gpu)?;
    let average_fps = average_fps(tier(cpu), tier(gpu), resolution);
    Some(FpsEstimate {
        average_fps,
        chart: chart(average_fps, rng),
    })
}

/// Upward curve ending exactly on the average, with a little jitter per point.
fn chart<R: Rng>(average_fps: u32, rng: &mut R) -> Vec<ChartPoint> {
    let target = f64::from(average_fps);
    let mut current = (target * 0.3).max(f64::from(MIN_FPS));
    let steps = CHART_LABELS.len() as f64;

    let mut points: Vec<ChartPoint> = CHART_LABELS
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let progress = (i + 1) as f64 / steps;
            let jitter = target * rng.gen_range(-0.05..0.05);
            let average = (current + (target - current) * progress + jitter).max(0.0);
            let lows = average * rng.gen_range(0.70..0.80);
            current = average;
            ChartPoint {
                label,
                average: average.round() as u32,
                lows: lows.round() as u32,
            }
        })
        .collect();

    if let Some(last) = points.last_mut() {
        last.average = average_fps;
        last.lows = (target * 0.75).round() as u32;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PartRecord, component};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn build(cpu_tier: i64, gpu_tier: i64) -> Build {
        Build::new()
            .with(component(PartRecord::new("cpu", Category::Cpu, "CPU").with_tier(cpu_tier)))
            .with(component(PartRecord::new("gpu", Category::Gpu, "GPU").with_tier(gpu_tier)))
    }

    fn estimate(build: &Build, resolution: Resolution) -> Option<FpsEstimate> {
        estimate_fps_with(build, resolution, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn matched_flagship_hits_table_value() {
        let result = estimate(&build(4, 4), Resolution::P1080).unwrap();
        assert_eq!(result.average_fps, 240);
    }

    #[test]
    fn weak_cpu_takes_the_largest_penalty() {
        let result = estimate(&build(1, 4), Resolution::P1080).unwrap();
        assert_eq!(result.average_fps, 156);
    }

    #[test]
    fn penalty_table_by_resolution() {
        assert_eq!(average_fps(Tier::clamped(2), Tier::MAX, Resolution::P1440), 150);
        assert_eq!(average_fps(Tier::clamped(3), Tier::MAX, Resolution::Uhd4k), 100);
        assert_eq!(average_fps(Tier::clamped(2), Tier::MAX, Resolution::Uhd4k), 95);
        assert_eq!(average_fps(Tier::MAX, Tier::MIN, Resolution::Uhd4k), 25);
    }

    #[test]
    fn chart_ends_on_the_average() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = estimate_fps_with(&build(2, 3), Resolution::P1440, &mut rng).unwrap();
            assert_eq!(result.chart.len(), 5);
            let last = result.chart.last().unwrap();
            assert_eq!(last.average, result.average_fps);
            assert_eq!(last.lows, (f64::from(result.average_fps) * 0.75).round() as u32);
            assert!(result.chart[0].average < last.average);
        }
    }

    #[test]
    fn chart_lows_stay_under_average() {
        let result = estimate(&build(4, 4), Resolution::P1080).unwrap();
        for point in &result.chart {
            assert!(point.lows <= point.average);
        }
    }

    #[test]
    fn missing_cpu_or_gpu_gives_nothing() {
        let gpu_only = Build::new()
            .with(component(PartRecord::new("gpu", Category::Gpu, "GPU").with_tier(4)));
        let cpu_only = Build::new()
            .with(component(PartRecord::new("cpu", Category::Cpu, "CPU").with_tier(4)));
        for resolution in [Resolution::P1080, Resolution::P1440, Resolution::Uhd4k] {
            assert!(estimate_fps(&gpu_only, resolution).is_none());
            assert!(estimate_fps(&cpu_only, resolution).is_none());
            assert!(estimate_fps(&Build::new(), resolution).is_none());
        }
    }
}
