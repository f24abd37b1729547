//! Charging session state
//!
//! A `ChargeSession` is created once at bootstrap, mutated only by the
//! controller as it commits actuator changes, and dropped at process end.
//! It holds the completion-time window, the current target SoC, and the
//! position in the vehicle's ladder of supported AC current limits.

use crate::config::WindowConfig;
use crate::error::{KairosError, Result};
use crate::soc::SocBounds;
use crate::vehicle::ChargingProfile;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Mutable state of one charge-window control session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeSession {
    /// Unique session ID, used for log correlation
    pub id: String,

    /// When the session started
    start_time: DateTime<Utc>,

    /// Earliest acceptable completion time
    min_end_time: DateTime<Utc>,

    /// Latest acceptable completion time
    max_end_time: DateTime<Utc>,

    /// Current target SoC, a grid value within the configured bounds
    target_soc: u8,

    /// Index into `ac_limit_options`
    ac_limit_index: usize,

    /// Supported AC current limits in amperes, ascending, fixed for the session
    ac_limit_options: Vec<u16>,

    /// Mirror of the last known preconditioning state
    preconditioning_active: bool,
}

impl ChargeSession {
    /// Build a session from the configured window, the SoC bounds, and the
    /// vehicle's reported state at bootstrap.
    ///
    /// The initial target is the next grid value above the current battery
    /// level; the AC limit index starts at the vehicle's present limit, or at
    /// the lowest supported limit when the present one is not in the list.
    pub fn new(
        start_time: DateTime<Utc>,
        window: &WindowConfig,
        bounds: SocBounds,
        current_soc: u8,
        profile: ChargingProfile,
    ) -> Result<Self> {
        if profile.ac_available_limits.is_empty() {
            return Err(KairosError::invalid_state(
                "Vehicle reported no available AC current limits",
            ));
        }
        if !profile.ac_available_limits.is_sorted() {
            return Err(KairosError::validation(
                "ac_available_limits",
                "AC limit options must be ascending",
            ));
        }

        let min_end_time = start_time + hours_to_duration(window.min_charge_hours);
        let max_end_time = start_time + hours_to_duration(window.max_charge_hours);
        if !(start_time < min_end_time && min_end_time < max_end_time) {
            return Err(KairosError::validation(
                "window",
                "Charge window must satisfy start < min_end < max_end",
            ));
        }

        let target_soc = bounds.next_target(i16::from(current_soc));
        let ac_limit_index = profile
            .ac_current_limit
            .and_then(|limit| {
                profile
                    .ac_available_limits
                    .iter()
                    .position(|&a| a == limit)
            })
            .unwrap_or(0);

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            start_time,
            min_end_time,
            max_end_time,
            target_soc,
            ac_limit_index,
            ac_limit_options: profile.ac_available_limits,
            preconditioning_active: false,
        })
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn min_end_time(&self) -> DateTime<Utc> {
        self.min_end_time
    }

    pub fn max_end_time(&self) -> DateTime<Utc> {
        self.max_end_time
    }

    pub fn target_soc(&self) -> u8 {
        self.target_soc
    }

    pub fn ac_limit_index(&self) -> usize {
        self.ac_limit_index
    }

    pub fn ac_limit_options(&self) -> &[u16] {
        &self.ac_limit_options
    }

    /// The amperage currently selected by `ac_limit_index`
    pub fn current_ac_limit(&self) -> u16 {
        self.ac_limit_options[self.ac_limit_index]
    }

    /// Amperage for an arbitrary index, if valid
    pub fn ac_limit_at(&self, index: usize) -> Option<u16> {
        self.ac_limit_options.get(index).copied()
    }

    pub fn preconditioning_active(&self) -> bool {
        self.preconditioning_active
    }

    /// Refresh the preconditioning mirror from observed climate state
    pub fn set_preconditioning_active(&mut self, active: bool) {
        self.preconditioning_active = active;
    }

    /// Commit a new target SoC (caller guarantees it is a valid grid value)
    pub(crate) fn set_target_soc(&mut self, target_soc: u8) {
        self.target_soc = target_soc;
    }

    /// Commit a new AC limit index (caller guarantees it is in range)
    pub(crate) fn set_ac_limit_index(&mut self, index: usize) {
        debug_assert!(index < self.ac_limit_options.len());
        self.ac_limit_index = index;
    }
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(limits: &[u16], current: Option<u16>) -> ChargingProfile {
        ChargingProfile {
            ac_available_limits: limits.to_vec(),
            ac_current_limit: current,
        }
    }

    #[test]
    fn bootstrap_computes_window_and_target() {
        let start = Utc::now();
        let window = WindowConfig {
            min_charge_hours: 24.0,
            max_charge_hours: 48.0,
        };
        let session = ChargeSession::new(
            start,
            &window,
            SocBounds::new(50, 70),
            42,
            profile(&[6, 8, 10, 16], Some(10)),
        )
        .unwrap();

        assert_eq!(session.min_end_time() - start, Duration::hours(24));
        assert_eq!(session.max_end_time() - start, Duration::hours(48));
        assert_eq!(session.target_soc(), 50);
        assert_eq!(session.ac_limit_index(), 2);
        assert_eq!(session.current_ac_limit(), 10);
        assert!(!session.preconditioning_active());
    }

    #[test]
    fn unknown_present_limit_falls_back_to_lowest() {
        let window = WindowConfig::default();
        let session = ChargeSession::new(
            Utc::now(),
            &window,
            SocBounds::new(50, 70),
            60,
            profile(&[6, 8, 10, 16], Some(32)),
        )
        .unwrap();
        assert_eq!(session.ac_limit_index(), 0);
        assert_eq!(session.current_ac_limit(), 6);
    }

    #[test]
    fn empty_limit_list_is_rejected() {
        let window = WindowConfig::default();
        let err = ChargeSession::new(
            Utc::now(),
            &window,
            SocBounds::new(50, 70),
            60,
            profile(&[], None),
        )
        .unwrap_err();
        assert!(matches!(err, KairosError::InvalidState { .. }));
    }

    #[test]
    fn unsorted_limit_list_is_rejected() {
        let window = WindowConfig::default();
        let err = ChargeSession::new(
            Utc::now(),
            &window,
            SocBounds::new(50, 70),
            60,
            profile(&[16, 6, 10], Some(6)),
        )
        .unwrap_err();
        assert!(matches!(err, KairosError::Validation { .. }));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let window = WindowConfig {
            min_charge_hours: 48.0,
            max_charge_hours: 24.0,
        };
        let err = ChargeSession::new(
            Utc::now(),
            &window,
            SocBounds::new(50, 70),
            60,
            profile(&[6, 8], Some(6)),
        )
        .unwrap_err();
        assert!(matches!(err, KairosError::Validation { .. }));
    }
}
