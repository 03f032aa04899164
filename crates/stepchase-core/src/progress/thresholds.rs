//! One-shot milestones along a monotonic axis.
//!
//! A [`Tracker`] remembers which milestones have fired. Each evaluation walks
//! the milestones in ascending order and fires every one that is reached and
//! has not fired yet, so a single large jump still yields each intermediate
//! milestone exactly once, in order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::alerts::Alert;

pub trait Milestone: Copy + Ord + std::fmt::Debug + 'static {
    /// Every milestone on the axis, lowest first.
    const ALL: &'static [Self];

    fn alert(self) -> Alert;
}

/// Percentage-of-goal milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMilestone {
    Quarter,
    Half,
    ThreeQuarters,
    Goal,
}

impl StepMilestone {
    pub fn percent(self) -> u32 {
        match self {
            StepMilestone::Quarter => 25,
            StepMilestone::Half => 50,
            StepMilestone::ThreeQuarters => 75,
            StepMilestone::Goal => 100,
        }
    }
}

impl Milestone for StepMilestone {
    const ALL: &'static [Self] = &[
        StepMilestone::Quarter,
        StepMilestone::Half,
        StepMilestone::ThreeQuarters,
        StepMilestone::Goal,
    ];

    fn alert(self) -> Alert {
        match self {
            StepMilestone::Quarter => Alert::milestone_25_percent(),
            StepMilestone::Half => Alert::milestone_50_percent(),
            StepMilestone::ThreeQuarters => Alert::milestone_75_percent(),
            StepMilestone::Goal => Alert::goal_complete(),
        }
    }
}

/// How close Nessie is to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityMilestone {
    Halfway,
    Almost,
    Caught,
}

impl ProximityMilestone {
    /// Whether Nessie at `antagonist` has reached this milestone against a
    /// player at `player`. Nothing is reached before Nessie leaves the start.
    pub fn reached(self, antagonist: f64, player: f64) -> bool {
        if antagonist <= 0.0 {
            return false;
        }
        match self {
            ProximityMilestone::Halfway => proximity(antagonist, player) >= 0.5,
            ProximityMilestone::Almost => proximity(antagonist, player) >= 0.9,
            ProximityMilestone::Caught => antagonist >= player,
        }
    }
}

impl Milestone for ProximityMilestone {
    const ALL: &'static [Self] = &[
        ProximityMilestone::Halfway,
        ProximityMilestone::Almost,
        ProximityMilestone::Caught,
    ];

    fn alert(self) -> Alert {
        match self {
            ProximityMilestone::Halfway => Alert::nessie_50_percent(),
            ProximityMilestone::Almost => Alert::nessie_90_percent(),
            ProximityMilestone::Caught => Alert::caught_by_nessie(),
        }
    }
}

/// Fraction of the player's distance Nessie has covered.
pub fn proximity(antagonist: f64, player: f64) -> f64 {
    antagonist / player.max(f64::EPSILON)
}

/// Whole percent of `goal` covered by `steps`; 0 without a usable goal.
pub fn percent_of_goal(steps: u32, goal: Option<u32>) -> u32 {
    match goal {
        Some(goal) if goal > 0 => {
            let pct = u64::from(steps) * 100 / u64::from(goal);
            u32::try_from(pct).unwrap_or(u32::MAX)
        }
        _ => 0,
    }
}

#[derive(Debug, Clone)]
pub struct Tracker<M: Milestone> {
    fired: BTreeSet<M>,
}

impl<M: Milestone> Tracker<M> {
    pub fn new() -> Self {
        Self {
            fired: BTreeSet::new(),
        }
    }

    /// Fire every unfired milestone for which `reached` holds, lowest first.
    pub fn advance(&mut self, reached: impl Fn(M) -> bool) -> Vec<M> {
        let mut newly = Vec::new();
        for &milestone in M::ALL {
            if !self.fired.contains(&milestone) && reached(milestone) {
                self.fired.insert(milestone);
                newly.push(milestone);
            }
        }
        newly
    }

    pub fn has_fired(&self, milestone: M) -> bool {
        self.fired.contains(&milestone)
    }

    pub fn clear(&mut self) {
        self.fired.clear();
    }
}

impl<M: Milestone> Default for Tracker<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_without_goal_is_zero() {
        assert_eq!(percent_of_goal(500, None), 0);
        assert_eq!(percent_of_goal(500, Some(0)), 0);
    }

    #[test]
    fn percent_rounds_down() {
        assert_eq!(percent_of_goal(99, Some(400)), 24);
        assert_eq!(percent_of_goal(100, Some(400)), 25);
        assert_eq!(percent_of_goal(800, Some(400)), 200);
    }

    #[test]
    fn percent_does_not_overflow() {
        assert_eq!(percent_of_goal(u32::MAX, Some(1)), u32::MAX);
    }

    #[test]
    fn jump_fires_all_in_order() {
        let mut tracker = Tracker::<StepMilestone>::new();
        let fired = tracker.advance(|m| m.percent() <= 100);
        assert_eq!(fired, StepMilestone::ALL.to_vec());
    }

    #[test]
    fn fired_milestones_do_not_repeat() {
        let mut tracker = Tracker::<StepMilestone>::new();
        assert_eq!(tracker.advance(|m| m.percent() <= 50).len(), 2);
        assert!(tracker.advance(|m| m.percent() <= 50).is_empty());
        assert_eq!(tracker.advance(|m| m.percent() <= 75), vec![StepMilestone::ThreeQuarters]);
    }

    #[test]
    fn clear_rearms() {
        let mut tracker = Tracker::<StepMilestone>::new();
        tracker.advance(|_| true);
        tracker.clear();
        assert!(!tracker.has_fired(StepMilestone::Quarter));
        assert_eq!(tracker.advance(|_| true).len(), 4);
    }

    #[test]
    fn proximity_needs_nessie_to_move() {
        for &m in ProximityMilestone::ALL {
            assert!(!m.reached(0.0, 0.0));
        }
    }

    #[test]
    fn proximity_levels() {
        assert!(ProximityMilestone::Halfway.reached(50.0, 100.0));
        assert!(!ProximityMilestone::Almost.reached(89.0, 100.0));
        assert!(ProximityMilestone::Almost.reached(90.0, 100.0));
        assert!(!ProximityMilestone::Caught.reached(99.0, 100.0));
        assert!(ProximityMilestone::Caught.reached(100.0, 100.0));
    }

    #[test]
    fn player_at_start_is_caught_once_nessie_moves() {
        assert!(ProximityMilestone::Caught.reached(0.1, 0.0));
        assert!(ProximityMilestone::Almost.reached(0.1, 0.0));
    }
}
