//! The stat engine.
//!
//! Characters carry three integer stats. Actions move exactly one of them:
//! feeding raises stamina, sleeping raises energy and fighting moves health
//! up or down at random. Stats never drop below zero and have no ceiling.
//! A character whose health sits at zero is *fallen*; this is a display
//! state only and every action stays available.

use std::fmt;
use std::str::FromStr;

use model::entities::character::{self, DEFAULT_STAT};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::GameError;

pub const FEED_STAMINA_GAIN: i32 = 5;
pub const SLEEP_ENERGY_GAIN: i32 = 5;
pub const FIGHT_WIN_HEALTH: i32 = 3;
pub const FIGHT_LOSS_HEALTH: i32 = -2;
/// Chance that a fight ends in [`FIGHT_WIN_HEALTH`].
pub const FIGHT_WIN_PROBABILITY: f64 = 0.5;

/// Something a player can make a character do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Feed,
    Sleep,
    Fight,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Feed, Action::Sleep, Action::Fight];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Feed => "feed",
            Action::Sleep => "sleep",
            Action::Fight => "fight",
        }
    }

    /// The stat this action changes.
    pub fn stat(&self) -> Stat {
        match self {
            Action::Feed => Stat::Stamina,
            Action::Sleep => Stat::Energy,
            Action::Fight => Stat::Health,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feed" => Ok(Action::Feed),
            "sleep" => Ok(Action::Sleep),
            "fight" => Ok(Action::Fight),
            other => Err(GameError::Validation(format!(
                "Unknown action '{}', expected one of feed, sleep, fight",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Health,
    Stamina,
    Energy,
}

/// The three mutable stats of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub health: i32,
    pub stamina: i32,
    pub energy: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            health: DEFAULT_STAT,
            stamina: DEFAULT_STAT,
            energy: DEFAULT_STAT,
        }
    }
}

impl Stats {
    pub fn new(health: i32, stamina: i32, energy: i32) -> Self {
        Self {
            health,
            stamina,
            energy,
        }
    }

    pub fn is_fallen(&self) -> bool {
        self.health == 0
    }

    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Health => self.health,
            Stat::Stamina => self.stamina,
            Stat::Energy => self.energy,
        }
    }

    fn get_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Health => &mut self.health,
            Stat::Stamina => &mut self.stamina,
            Stat::Energy => &mut self.energy,
        }
    }
}

impl From<&character::Model> for Stats {
    fn from(model: &character::Model) -> Self {
        Self::new(model.health, model.stamina, model.energy)
    }
}

/// Result of applying one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    pub action: Action,
    pub stat: Stat,
    /// Delta before clamping at zero.
    pub rolled: i32,
    /// Delta that actually landed on the stat.
    pub applied: i32,
    pub stats: Stats,
}

impl ActionOutcome {
    pub fn fallen(&self) -> bool {
        self.stats.is_fallen()
    }
}

/// Draw the health delta of a single fight.
pub fn roll_fight<R: Rng>(rng: &mut R) -> i32 {
    if rng.gen_bool(FIGHT_WIN_PROBABILITY) {
        FIGHT_WIN_HEALTH
    } else {
        FIGHT_LOSS_HEALTH
    }
}

/// Add `delta` to `value` with a floor of zero, saturating at `i32::MAX`.
pub fn add_floored(value: i32, delta: i32) -> i32 {
    value.saturating_add(delta).max(0)
}

/// Apply `action` to `stats`, drawing from `rng` when the action is random.
pub fn apply_action<R: Rng>(stats: Stats, action: Action, rng: &mut R) -> ActionOutcome {
    trace!("Applying action {} to {:?}", action, stats);

    let stat = action.stat();
    let rolled = match action {
        Action::Feed => FEED_STAMINA_GAIN,
        Action::Sleep => SLEEP_ENERGY_GAIN,
        Action::Fight => roll_fight(rng),
    };

    let mut next = stats;
    let before = next.get(stat);
    let slot = next.get_mut(stat);
    *slot = add_floored(before, rolled);
    let applied = *slot - before;

    debug!(
        "Action {} rolled {:+} on {:?}, applied {:+} ({} -> {})",
        action,
        rolled,
        stat,
        applied,
        before,
        next.get(stat)
    );

    ActionOutcome {
        action,
        stat,
        rolled,
        applied,
        stats: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    /// An RNG whose `gen_bool(0.5)` always returns true.
    fn always_win() -> StepRng {
        StepRng::new(0, 0)
    }

    /// An RNG whose `gen_bool(0.5)` always returns false.
    fn always_lose() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_default_stats() {
        let stats = Stats::default();
        assert_eq!(stats, Stats::new(50, 50, 50));
        assert!(!stats.is_fallen());
    }

    #[test]
    fn test_feed_raises_stamina_only() {
        let outcome = apply_action(Stats::default(), Action::Feed, &mut always_win());

        assert_eq!(outcome.stats, Stats::new(50, 55, 50));
        assert_eq!(outcome.stat, Stat::Stamina);
        assert_eq!(outcome.applied, 5);
    }

    #[test]
    fn test_sleep_raises_energy_only() {
        let outcome = apply_action(Stats::default(), Action::Sleep, &mut always_lose());

        assert_eq!(outcome.stats, Stats::new(50, 50, 55));
        assert_eq!(outcome.stat, Stat::Energy);
    }

    #[test]
    fn test_fight_win_and_loss() {
        let won = apply_action(Stats::default(), Action::Fight, &mut always_win());
        assert_eq!(won.stats.health, 53);
        assert_eq!(won.rolled, FIGHT_WIN_HEALTH);

        let lost = apply_action(Stats::default(), Action::Fight, &mut always_lose());
        assert_eq!(lost.stats.health, 48);
        assert_eq!(lost.rolled, FIGHT_LOSS_HEALTH);
        assert_eq!((lost.stats.stamina, lost.stats.energy), (50, 50));
    }

    #[test]
    fn test_fight_clamps_health_at_zero() {
        let outcome = apply_action(Stats::new(1, 50, 50), Action::Fight, &mut always_lose());

        assert_eq!(outcome.rolled, -2);
        assert_eq!(outcome.applied, -1);
        assert_eq!(outcome.stats.health, 0);
        assert!(outcome.fallen());
    }

    #[test]
    fn test_fallen_character_can_keep_acting() {
        let fallen = Stats::new(0, 50, 50);

        let still_down = apply_action(fallen, Action::Fight, &mut always_lose());
        assert_eq!(still_down.stats.health, 0);
        assert_eq!(still_down.applied, 0);

        let back_up = apply_action(fallen, Action::Fight, &mut always_win());
        assert_eq!(back_up.stats.health, 3);
        assert!(!back_up.fallen());

        let fed = apply_action(fallen, Action::Feed, &mut always_win());
        assert_eq!(fed.stats.stamina, 55);
        assert!(fed.fallen());
    }

    #[test]
    fn test_repeated_fights_stay_non_negative() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut stats = Stats::default();

        for _ in 0..1000 {
            let before = stats.health;
            let outcome = apply_action(stats, Action::Fight, &mut rng);

            assert!(outcome.rolled == FIGHT_WIN_HEALTH || outcome.rolled == FIGHT_LOSS_HEALTH);
            assert_eq!(outcome.stats.health, (before + outcome.rolled).max(0));
            assert!(outcome.stats.health >= 0);
            stats = outcome.stats;
        }
    }

    #[test]
    fn test_no_ceiling_but_no_overflow() {
        let outcome = apply_action(Stats::new(50, 1_000, 50), Action::Feed, &mut always_win());
        assert_eq!(outcome.stats.stamina, 1_005);

        let saturated = apply_action(Stats::new(50, i32::MAX - 1, 50), Action::Feed, &mut always_win());
        assert_eq!(saturated.stats.stamina, i32::MAX);
        assert_eq!(saturated.applied, 1);
    }

    #[test]
    fn test_action_parsing() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }

        let err = "dance".parse::<Action>().unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[test]
    fn test_action_serde_is_lowercase() {
        let json = serde_json::to_string(&Action::Fight).unwrap();
        assert_eq!(json, "\"fight\"");

        let parsed: Action = serde_json::from_str("\"sleep\"").unwrap();
        assert_eq!(parsed, Action::Sleep);
    }
}
