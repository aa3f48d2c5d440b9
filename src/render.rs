// 📊 Render Models - what the chart and progress widgets consume
// Read-only views over tracker state. Colors are hex strings so any front end
// (terminal, web) can map them.

use serde::Serialize;

use crate::funds::FundState;
use crate::goals::{Goal, Priority};

pub const HIGH_COLORS: [&str; 4] = ["#ff4d4d", "#ff6666", "#ff8080", "#ff9999"];
pub const MEDIUM_COLOR: &str = "#ffdd57";
pub const LOW_COLOR: &str = "#aaaaaa";

pub const GYM_COLOR: &str = "#00bfff";
pub const WEEKLY_COLOR: &str = "#00ff99";
pub const PROTEIN_COLOR: &str = "#ffcc00";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

impl ChartSlice {
    /// Fraction of `total` this slice takes (0 for an empty chart)
    pub fn share(&self, total: f64) -> f64 {
        if total > 0.0 {
            self.value / total
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressBar {
    pub current: f64,
    pub target: f64,
}

impl ProgressBar {
    /// Clamped to [0, 1]
    pub fn ratio(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.current / self.target).clamp(0.0, 1.0)
    }

    pub fn percent(&self) -> u16 {
        (self.ratio() * 100.0).round() as u16
    }
}

/// High goals cycle through shades of red by list position
pub fn goal_color(priority: Priority, index: usize) -> &'static str {
    match priority {
        Priority::High => HIGH_COLORS[index % HIGH_COLORS.len()],
        Priority::Medium => MEDIUM_COLOR,
        Priority::Low => LOW_COLOR,
    }
}

pub fn fund_slices(funds: &FundState) -> Vec<ChartSlice> {
    vec![
        ChartSlice {
            label: "Gym".to_string(),
            value: funds.gym,
            color: GYM_COLOR,
        },
        ChartSlice {
            label: "Weekly".to_string(),
            value: funds.weekly,
            color: WEEKLY_COLOR,
        },
        ChartSlice {
            label: "Protein".to_string(),
            value: funds.protein,
            color: PROTEIN_COLOR,
        },
    ]
}

pub fn goal_slices(goals: &[Goal]) -> Vec<ChartSlice> {
    goals
        .iter()
        .enumerate()
        .map(|(i, g)| ChartSlice {
            label: g.name.clone(),
            value: g.amount as f64,
            color: goal_color(g.priority, i),
        })
        .collect()
}

pub fn goal_progress(goal: &Goal) -> ProgressBar {
    ProgressBar {
        current: goal.amount as f64,
        target: goal.target as f64,
    }
}

/// Parse "#rrggbb" into components (terminal front ends need RGB)
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
