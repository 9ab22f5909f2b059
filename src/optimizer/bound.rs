//! Upper-bound discovery by doubling
//!
//! The bound only narrows the binary search. It is not guaranteed tight, and a
//! fallback bound may not win at all, so the search must cope with either.

use serde::{Deserialize, Serialize};

use crate::battle::log::group_thousands;
use crate::core::config::SearchConfig;
use crate::optimizer::probe::{ProbeSession, ProbeStop};

/// Upper end of the binary search range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpperBound {
    pub value: u64,
    /// A probe at `value` achieved a zero-loss win
    pub confirmed: bool,
}

/// Double from `initial_bound` until a zero-loss win or the attempt cap
///
/// Gives up after `max_doubling_attempts` probes and falls back to
/// `max_bound` unconfirmed.
pub fn find_upper_bound(
    session: &mut ProbeSession<'_>,
    config: &SearchConfig,
) -> std::result::Result<UpperBound, ProbeStop> {
    let mut high = config.initial_bound.min(config.max_bound);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let verdict = session.run(high)?;

        if verdict.is_zero_loss() {
            session.log(format!("Found working upper bound: {}", group_thousands(high)));
            return Ok(UpperBound {
                value: high,
                confirmed: true,
            });
        }

        if attempts >= config.max_doubling_attempts || high >= config.max_bound {
            let value = config.max_bound;
            session.log(format!("Using maximum upper bound: {}", group_thousands(value)));
            tracing::debug!("No zero-loss bound after {} attempts, using {}", attempts, value);
            return Ok(UpperBound {
                value,
                confirmed: false,
            });
        }

        high = high.saturating_mul(2).min(config.max_bound);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::probe::testing::ThresholdProbe;

    #[test]
    fn test_initial_bound_confirmed() {
        let probe = ThresholdProbe::new(37);
        let mut session = ProbeSession::new(&probe, 20);
        let bound = find_upper_bound(&mut session, &SearchConfig::default()).unwrap();
        assert_eq!(
            bound,
            UpperBound {
                value: 100_000,
                confirmed: true
            }
        );
        assert_eq!(session.used(), 1);
    }

    #[test]
    fn test_doubles_until_success() {
        let probe = ThresholdProbe::new(350_000);
        let mut session = ProbeSession::new(&probe, 20);
        let bound = find_upper_bound(&mut session, &SearchConfig::default()).unwrap();
        // 100k, 200k, 400k
        assert_eq!(bound.value, 400_000);
        assert!(bound.confirmed);
        assert_eq!(session.used(), 3);
    }

    #[test]
    fn test_falls_back_to_max_after_attempts() {
        let probe = ThresholdProbe::never();
        let mut session = ProbeSession::new(&probe, 20);
        let bound = find_upper_bound(&mut session, &SearchConfig::default()).unwrap();
        assert_eq!(bound.value, 10_000_000);
        assert!(!bound.confirmed);
        assert_eq!(session.used(), 5);
        assert!(session
            .into_log()
            .iter()
            .any(|line| line.starts_with("Using maximum upper bound")));
    }

    #[test]
    fn test_small_max_bound_stops_doubling() {
        let config = SearchConfig {
            initial_bound: 8,
            max_bound: 20,
            ..Default::default()
        };
        let probe = ThresholdProbe::never();
        let mut session = ProbeSession::new(&probe, 20);
        let bound = find_upper_bound(&mut session, &config).unwrap();
        // 8, 16, 20
        assert_eq!(session.used(), 3);
        assert_eq!(bound.value, 20);
    }
}
