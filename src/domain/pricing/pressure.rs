//! Demand-pressure rate table: best-available-rate ladders per pressure level.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::finite_or_zero;

/// Upper bound on ladder length.
pub const MAX_BARS: u8 = 20;

/// Demand pressure, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl PressureLevel {
    pub const ALL: [PressureLevel; 5] = [
        PressureLevel::VeryLow,
        PressureLevel::Low,
        PressureLevel::Medium,
        PressureLevel::High,
        PressureLevel::VeryHigh,
    ];

    /// Level for an occupancy percentage. Upper bounds are inclusive:
    /// 25, 40, 65 and 85. Non-finite input reads as 0.
    pub fn classify(occupancy_pct: f64) -> Self {
        let occupancy = finite_or_zero(occupancy_pct);
        if occupancy <= 25.0 {
            PressureLevel::VeryLow
        } else if occupancy <= 40.0 {
            PressureLevel::Low
        } else if occupancy <= 65.0 {
            PressureLevel::Medium
        } else if occupancy <= 85.0 {
            PressureLevel::High
        } else {
            PressureLevel::VeryHigh
        }
    }
}

/// Starting rate for each pressure level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BaseRates {
    pub very_low: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub very_high: f64,
}

impl Default for BaseRates {
    fn default() -> Self {
        Self {
            very_low: 60.0,
            low: 65.0,
            medium: 75.0,
            high: 110.0,
            very_high: 150.0,
        }
    }
}

impl BaseRates {
    pub fn get(&self, level: PressureLevel) -> f64 {
        match level {
            PressureLevel::VeryLow => self.very_low,
            PressureLevel::Low => self.low,
            PressureLevel::Medium => self.medium,
            PressureLevel::High => self.high,
            PressureLevel::VeryHigh => self.very_high,
        }
    }

    fn slot(&mut self, level: PressureLevel) -> &mut f64 {
        match level {
            PressureLevel::VeryLow => &mut self.very_low,
            PressureLevel::Low => &mut self.low,
            PressureLevel::Medium => &mut self.medium,
            PressureLevel::High => &mut self.high,
            PressureLevel::VeryHigh => &mut self.very_high,
        }
    }
}

/// Rates offered at one pressure level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLadder {
    pub level: PressureLevel,
    pub base: f64,
    /// BAR 1..=n
    pub bars: Vec<f64>,
    /// One step above the last BAR.
    pub rack_rate: f64,
}

/// Step size, ladder length and base rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureTable {
    step: f64,
    bars: u8,
    base_rates: BaseRates,
}

impl Default for PressureTable {
    fn default() -> Self {
        Self {
            step: 10.0,
            bars: 5,
            base_rates: BaseRates::default(),
        }
    }
}

impl PressureTable {
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bars(&self) -> u8 {
        self.bars
    }

    pub fn base_rates(&self) -> &BaseRates {
        &self.base_rates
    }

    pub fn set_step(&mut self, step: f64) {
        self.step = finite_or_zero(step);
    }

    /// Sets the ladder length, clamped to `MAX_BARS`. Returns the applied length.
    pub fn set_bars(&mut self, bars: u8) -> u8 {
        self.bars = bars.min(MAX_BARS);
        self.bars
    }

    pub fn set_base_rate(&mut self, level: PressureLevel, rate: f64) {
        *self.base_rates.slot(level) = finite_or_zero(rate);
    }

    /// `base + step × i` for `i` in `1..=bars`, then the rack rate.
    pub fn ladder(&self, level: PressureLevel) -> RateLadder {
        let base = self.base_rates.get(level);
        let bars = (1..=self.bars)
            .map(|i| base + self.step * f64::from(i))
            .collect();
        RateLadder {
            level,
            base,
            bars,
            rack_rate: base + self.step * f64::from(u32::from(self.bars) + 1),
        }
    }

    pub fn ladders(&self) -> Vec<RateLadder> {
        PressureLevel::ALL.iter().map(|l| self.ladder(*l)).collect()
    }
}
