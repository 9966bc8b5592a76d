//! CPU/GPU balance verdict

use crate::models::{BottleneckResult, BottleneckStatus, Build, Category, Resolution, Tone};
use crate::tier::{Tier, tier};

/// Classify the CPU/GPU pairing of `build` at `resolution`.
pub fn calculate_bottleneck(build: &Build, resolution: Resolution) -> BottleneckResult {
    let (Some(cpu), Some(gpu)) = (build.get(Category::Cpu), build.get(Category::Gpu)) else {
        return verdict(
            BottleneckStatus::Incomplete,
            Tone::Unknown,
            "Add both a CPU and GPU to see bottleneck analysis.",
        );
    };
    classify(tier(cpu), tier(gpu), resolution)
}

pub fn classify(cpu: Tier, gpu: Tier, resolution: Resolution) -> BottleneckResult {
    match cpu.delta(gpu) {
        delta if delta <= -2 => verdict(
            BottleneckStatus::SevereMismatch,
            Tone::Error,
            "The CPU is far weaker than the GPU and will hold back frame rates. Pair a faster processor with this card.",
        ),
        -1 if resolution == Resolution::Uhd4k => verdict(
            BottleneckStatus::Balanced,
            Tone::Ok,
            "At 4K the GPU sets the pace, so the slightly weaker CPU is not a limiting factor.",
        ),
        -1 => verdict(
            BottleneckStatus::SlightMismatch,
            Tone::Warn,
            "The CPU is a step behind the GPU. A faster processor would unlock more frames at this resolution.",
        ),
        delta if delta >= 2 => verdict(
            BottleneckStatus::SlightMismatch,
            Tone::Warn,
            "The CPU is far stronger than the GPU. Part of that CPU budget would be better spent on a faster graphics card.",
        ),
        _ => verdict(
            BottleneckStatus::Balanced,
            Tone::Ok,
            "The CPU and GPU are well matched for this resolution.",
        ),
    }
}

fn verdict(status: BottleneckStatus, tone: Tone, message: &str) -> BottleneckResult {
    BottleneckResult {
        status,
        message: message.to_string(),
        tone,
    }
}
