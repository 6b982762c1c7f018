//! Star ratings for steps and sessions.

use groove_core::Timestamp;

use crate::config::ScoringConfig;
use crate::steps::Step;

pub const MAX_STARS: u8 = 5;

/// Stars (0 to 5) earned by a step with the given per-position errors.
///
/// One star each for: at least half the positions acceptable, at least three
/// quarters acceptable, all acceptable, all acceptable with at least half
/// perfect, all perfect.
pub fn star_count(errors: &[f64], config: &ScoringConfig) -> u8 {
    if errors.is_empty() {
        return 0;
    }
    let m = errors.len() as f64;
    let ok = errors.iter().filter(|&&e| e < config.good).count() as f64;
    let perfect = errors.iter().filter(|&&e| e < config.perfect).count() as f64;

    let all_ok = ok >= m;
    [
        ok >= 0.5 * m,
        ok >= 0.75 * m,
        all_ok,
        all_ok && perfect >= 0.5 * m,
        perfect >= m,
    ]
    .into_iter()
    .filter(|&star| star)
    .count() as u8
}

/// Annotate every step with its stars
pub fn rate_steps(steps: &mut [Step], config: &ScoringConfig) {
    for step in steps.iter_mut() {
        step.stars = Some(star_count(&step.errors, config));
    }
}

/// Mean star count of all steps, rounded. Unrated steps count as zero.
pub fn session_rating(steps: &[Step]) -> u8 {
    if steps.is_empty() {
        return 0;
    }
    let total: u32 = steps.iter().map(|s| u32::from(s.stars.unwrap_or(0))).sum();
    (total as f64 / steps.len() as f64).round() as u8
}

/// Withhold the last step while it may still improve.
///
/// A step ending within `lookahead_ms` of the end of a live history whose
/// last position is not yet perfect is popped and returned. More frames may
/// turn up a better match for that position.
pub fn reject_provisional(
    steps: &mut Vec<Step>,
    history_end: Timestamp,
    lookahead_ms: i64,
    perfect: f64,
) -> Option<Step> {
    let last = steps.last()?;
    let near_edge = history_end - last.end < lookahead_ms;
    let settled = last.errors.last().is_some_and(|&e| e < perfect);
    if near_edge && !settled {
        let rejected = steps.pop();
        if let Some(step) = &rejected {
            tracing::debug!("withholding provisional step {} ending at {:?}", step.name, step.end);
        }
        return rejected;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(end: i64, errors: Vec<f64>) -> Step {
        Step {
            name: "running man right".to_string(),
            start: Timestamp::from_millis(end - 300),
            end: Timestamp::from_millis(end),
            errors,
            stars: None,
        }
    }

    #[test]
    fn test_star_thresholds() {
        let config = ScoringConfig::default();
        assert_eq!(star_count(&[0.1, 0.2, 0.9, 1.5], &config), 2);
        assert_eq!(star_count(&[0.1, 0.2, 0.3], &config), 5);
        assert_eq!(star_count(&[0.1, 0.2, 0.7, 0.8], &config), 4);
        assert_eq!(star_count(&[0.1, 0.7, 0.8, 0.9], &config), 3);
        assert_eq!(star_count(&[0.1, 1.7, 1.8, 0.9], &config), 1);
        assert_eq!(star_count(&[1.1, 1.7, 1.8, 0.9], &config), 0);
        assert_eq!(star_count(&[], &config), 0);
    }

    #[test]
    fn test_stars_never_exceed_max() {
        let config = ScoringConfig::default();
        for n in 1..8 {
            for k in 0..20 {
                let errors: Vec<f64> = (0..n).map(|i| ((i * 7 + k) % 15) as f64 / 10.0).collect();
                assert!(star_count(&errors, &config) <= MAX_STARS);
            }
        }
    }

    #[test]
    fn test_session_rating() {
        let config = ScoringConfig::default();
        let mut steps = vec![
            step(300, vec![0.1, 0.2]),
            step(600, vec![0.1, 0.9]),
            step(900, vec![1.5, 1.9]),
        ];
        rate_steps(&mut steps, &config);
        let stars: Vec<u8> = steps.iter().map(|s| s.stars.unwrap()).collect();
        assert_eq!(stars, vec![5, 4, 0]);
        assert_eq!(session_rating(&steps), 3);
        assert_eq!(session_rating(&[]), 0);
    }

    #[test]
    fn test_reject_provisional() {
        let mut steps = vec![step(300, vec![0.1, 0.2]), step(1_000, vec![0.1, 0.8])];
        let rejected = reject_provisional(&mut steps, Timestamp::from_millis(1_100), 200, 0.5);
        assert_eq!(rejected.unwrap().end.as_millis(), 1_000);
        assert_eq!(steps.len(), 1);

        // far enough from the edge
        assert!(reject_provisional(&mut steps, Timestamp::from_millis(1_100), 200, 0.5).is_none());
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_perfect_step_is_kept() {
        let mut steps = vec![step(1_000, vec![0.6, 0.1])];
        assert!(reject_provisional(&mut steps, Timestamp::from_millis(1_050), 200, 0.5).is_none());
        assert_eq!(steps.len(), 1);
        assert!(reject_provisional(&mut Vec::new(), Timestamp::from_millis(0), 200, 0.5).is_none());
    }
}
