use std::time::Duration;

use cogbat_stimuli::{SymmetryMode, stroop_pool_size};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Timing and sizing of one battery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub crt_trials: usize,
    /// Delay between showing a stimulus and opening its reaction-time window.
    pub presentation_delay_ms: u64,
    pub section_pause_ms: u64,
    /// Pause after the last CRT section, before the break countdown.
    pub final_pause_ms: u64,
    pub break_secs: u32,
    pub stroop_window_ms: u64,
    pub stroop_tick_ms: u64,
    pub stroop_nominal_trials: usize,
    pub stroop_pool_ratio: usize,
    pub feedback_flash_ms: u64,
    pub symmetry_mode: SymmetryMode,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            crt_trials: 40,
            presentation_delay_ms: 50,
            section_pause_ms: 1_000,
            final_pause_ms: 700,
            break_secs: 10,
            stroop_window_ms: 60_000,
            stroop_tick_ms: 200,
            stroop_nominal_trials: 60,
            stroop_pool_ratio: 4,
            feedback_flash_ms: 150,
            symmetry_mode: SymmetryMode::Mirror,
        }
    }
}

impl BatteryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.crt_trials == 0 || self.crt_trials % 2 != 0 {
            return Err(ConfigError::CrtTrials(self.crt_trials));
        }
        let positive = [
            ("stroop_window_ms", self.stroop_window_ms),
            ("stroop_tick_ms", self.stroop_tick_ms),
            ("stroop_nominal_trials", self.stroop_nominal_trials as u64),
            ("stroop_pool_ratio", self.stroop_pool_ratio as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        Ok(())
    }

    pub fn stroop_pool_size(&self) -> usize {
        stroop_pool_size(self.stroop_nominal_trials, self.stroop_pool_ratio)
    }

    /// Nominal trial count of a full session: every CRT section plus the Stroop target.
    pub fn nominal_total_trials(&self) -> usize {
        cogbat_core::CRT_ORDER.len() * self.crt_trials + self.stroop_nominal_trials
    }

    pub fn presentation_delay(&self) -> Duration {
        Duration::from_millis(self.presentation_delay_ms)
    }

    pub fn stroop_window(&self) -> Duration {
        Duration::from_millis(self.stroop_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_total_380() {
        let config = BatteryConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.nominal_total_trials(), 380);
        assert_eq!(config.stroop_pool_size(), 240);
    }

    #[test]
    fn rejects_odd_and_zero_counts() {
        let odd = BatteryConfig {
            crt_trials: 39,
            ..BatteryConfig::default()
        };
        assert_eq!(odd.validate(), Err(ConfigError::CrtTrials(39)));

        let no_tick = BatteryConfig {
            stroop_tick_ms: 0,
            ..BatteryConfig::default()
        };
        assert_eq!(
            no_tick.validate(),
            Err(ConfigError::Zero {
                field: "stroop_tick_ms"
            })
        );
    }
}
