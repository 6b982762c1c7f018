//! Picks the matching mode for a practice session.

use groove_core::Sample;
use groove_moves::{Catalog, Move};

use crate::anchored::match_to_recording;
use crate::config::MatchingConfig;
use crate::detection::{detect_positions, DetectedPosition};

/// Detected positions of a history.
///
/// Free-form detection with repeat suppression when no move is given,
/// anchored matching against `mv` otherwise. `None` only when anchored
/// matching finds nothing.
pub fn compute_positions(
    history: &[Sample],
    catalog: &Catalog,
    mv: Option<&Move>,
    config: &MatchingConfig,
) -> Option<Vec<DetectedPosition>> {
    match mv {
        None => Some(detect_positions(history, catalog, config)),
        Some(mv) => {
            match_to_recording(history, mv, config.min_dt, config.max_dt).map(|m| m.positions)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::{FacingDirection, Timestamp};

    fn performance(mv: &Move, beats: usize) -> Vec<Sample> {
        (0..beats)
            .map(|beat| {
                let pose = mv.position_at(beat).center_pose(FacingDirection::Left);
                Sample::from_pose(Timestamp::from_millis(beat as i64 * 400), pose)
            })
            .collect()
    }

    #[test]
    fn test_both_modes_agree_on_clean_input() {
        let catalog = Catalog::running_man();
        let mv = Move::running_man(&catalog).unwrap();
        let history = performance(&mv, 8);
        // windows narrow enough to hold one beat each
        let config = MatchingConfig {
            max_dt: 500,
            ..MatchingConfig::default()
        };

        let anchored = compute_positions(&history, &catalog, Some(&mv), &config).unwrap();
        assert_eq!(anchored.len(), 8);

        let freestyle = compute_positions(&history, &catalog, None, &config).unwrap();
        let anchored_ids: Vec<&str> = anchored.iter().map(|p| p.id()).collect();
        let freestyle_ids: Vec<&str> = freestyle.iter().map(|p| p.id()).collect();
        // free-form detection never reports the very first sample
        assert_eq!(freestyle_ids, anchored_ids[1..]);
        assert!(freestyle.iter().all(|p| p.facing_direction == FacingDirection::Left));
    }

    #[test]
    fn test_empty_history() {
        let catalog = Catalog::running_man();
        let mv = Move::running_man(&catalog).unwrap();
        let config = MatchingConfig::default();
        assert!(compute_positions(&[], &catalog, Some(&mv), &config).is_none());
        assert_eq!(compute_positions(&[], &catalog, None, &config), Some(Vec::new()));
    }
}
