//! Target state-of-charge quantization
//!
//! Target SoC values live on a fixed 5% grid between a configured minimum and
//! maximum. The quantizer picks the next valid grid value for a given battery
//! level and is used both to seed a session's starting target and to compute
//! stepped increases and decreases during control.

use crate::config::SocConfig;

/// Grid step between valid target SoC values, in percent
pub const SOC_GRID_STEP: u8 = 5;

/// Inclusive target-SoC bounds on the 5% grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocBounds {
    min: u8,
    max: u8,
}

impl SocBounds {
    /// Create bounds. Callers are expected to pass validated config values
    /// (multiples of 5, min < max); values are normalized defensively here so
    /// the quantizer stays total.
    pub fn new(min: u8, max: u8) -> Self {
        let min = min.min(100);
        let max = max.min(100).max(min);
        Self { min, max }
    }

    /// Lowest permitted target SoC
    pub fn min(&self) -> u8 {
        self.min
    }

    /// Highest permitted target SoC
    pub fn max(&self) -> u8 {
        self.max
    }

    /// Next valid target for the given battery level: the smallest grid value
    /// within bounds that is at least `current_soc + 5`, or the maximum bound
    /// when the level is already within one step of it.
    ///
    /// Takes `i16` so callers can quantize downward steps (e.g. `target - 10`)
    /// without underflow.
    pub fn next_target(&self, current_soc: i16) -> u8 {
        let mut target = self.min;
        while target <= self.max {
            if i16::from(target) >= current_soc + i16::from(SOC_GRID_STEP) {
                return target;
            }
            match target.checked_add(SOC_GRID_STEP) {
                Some(t) => target = t,
                None => break,
            }
        }
        self.max
    }

    /// Whether a target value is a valid grid point within bounds
    pub fn contains(&self, target_soc: u8) -> bool {
        target_soc >= self.min && target_soc <= self.max && target_soc % SOC_GRID_STEP == 0
    }
}

impl From<&SocConfig> for SocBounds {
    fn from(cfg: &SocConfig) -> Self {
        Self::new(cfg.min_target_soc, cfg.max_target_soc)
    }
}
