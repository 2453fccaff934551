use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Energy lost per elapsed hour when no interaction happens.
pub const DEFAULT_DECAY_RATE: f64 = 1.0;

/// Below this energy the companion is always sleepy.
const SLEEPY_ENERGY_THRESHOLD: i32 = 20;

/// After this many idle hours the mood falls back to neutral.
const NEUTRAL_HOURS_THRESHOLD: f64 = 24.0;

/// Display mood of the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Excited,
    Thoughtful,
    Sleepy,
    Neutral,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Excited => "excited",
            Mood::Thoughtful => "thoughtful",
            Mood::Sleepy => "sleepy",
            Mood::Neutral => "neutral",
        }
    }

    /// Parse a stored mood value. Anything unrecognized reads back as
    /// neutral so a row written by a newer version never breaks a read.
    pub fn parse(s: &str) -> Mood {
        match s {
            "happy" => Mood::Happy,
            "excited" => Mood::Excited,
            "thoughtful" => Mood::Thoughtful,
            "sleepy" => Mood::Sleepy,
            _ => Mood::Neutral,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discrete user interaction with the companion.
///
/// Unknown action strings map to `Unrecognized`, which the transition
/// table treats as a deliberate no-op (it still counts as an
/// interaction and advances the interaction timestamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Play,
    Feed,
    Chat,
    Rest,
    Unrecognized,
}

impl Action {
    pub fn parse(s: &str) -> Action {
        match s {
            "play" => Action::Play,
            "feed" => Action::Feed,
            "chat" => Action::Chat,
            "rest" => Action::Rest,
            _ => Action::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Play => "play",
            Action::Feed => "feed",
            Action::Chat => "chat",
            Action::Rest => "rest",
            Action::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Big Five dimensions plus five companion-specific traits.
///
/// All values live in [0.0, 1.0]. The interaction rules never mutate
/// them; they are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extraversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
    pub playfulness: f64,
    pub empathy: f64,
    pub humor: f64,
    pub supportiveness: f64,
    pub adaptability: f64,
}

impl Default for Personality {
    fn default() -> Self {
        Personality {
            openness: 0.7,
            conscientiousness: 0.8,
            extraversion: 0.6,
            agreeableness: 0.9,
            neuroticism: 0.2,
            playfulness: 0.7,
            empathy: 0.95,
            humor: 0.7,
            supportiveness: 0.95,
            adaptability: 0.8,
        }
    }
}

impl Personality {
    /// Iterate traits as (name, value) pairs, in a fixed order.
    pub fn traits(&self) -> [(&'static str, f64); 10] {
        [
            ("openness", self.openness),
            ("conscientiousness", self.conscientiousness),
            ("extraversion", self.extraversion),
            ("agreeableness", self.agreeableness),
            ("neuroticism", self.neuroticism),
            ("playfulness", self.playfulness),
            ("empathy", self.empathy),
            ("humor", self.humor),
            ("supportiveness", self.supportiveness),
            ("adaptability", self.adaptability),
        ]
    }
}

/// Mutable per-user companion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionState {
    pub mood: Mood,
    /// Clamped to [0, 100].
    pub energy: i32,
    /// Clamped to [0, 100]; never decreased by any action.
    pub bond_level: i32,
    /// Reference point for time decay. Advanced only by interactions,
    /// never by decay itself.
    pub last_interaction: DateTime<Utc>,
    pub total_interactions: u32,
    pub personality: Personality,
    pub experience_points: u32,
    pub skills: HashMap<String, u32>,
}

impl CompanionState {
    /// Default record created on first access for a user.
    pub fn new(now: DateTime<Utc>) -> Self {
        CompanionState {
            mood: Mood::Happy,
            energy: 85,
            bond_level: 50,
            last_interaction: now,
            total_interactions: 0,
            personality: Personality::default(),
            experience_points: 0,
            skills: HashMap::new(),
        }
    }

    /// Apply time decay against `last_interaction`.
    ///
    /// Energy drops by `floor(hours_passed * decay_rate)`, floored at
    /// zero. The mood override runs after the energy update: below 20
    /// energy the companion is sleepy; past 24 idle hours it goes
    /// neutral; otherwise the stored mood stands. `last_interaction`
    /// is left untouched, so repeated decayed reads keep measuring
    /// against the original timestamp.
    pub fn apply_time_decay(&mut self, now: DateTime<Utc>, decay_rate: f64) {
        // Clock skew can put last_interaction in the future; treat
        // that as zero elapsed time rather than refunding energy.
        let hours_passed =
            ((now - self.last_interaction).num_seconds() as f64 / 3600.0).max(0.0);

        let energy_loss = (hours_passed * decay_rate).floor() as i32;
        self.energy = (self.energy - energy_loss).max(0);

        if self.energy < SLEEPY_ENERGY_THRESHOLD {
            self.mood = Mood::Sleepy;
        } else if hours_passed > NEUTRAL_HOURS_THRESHOLD {
            self.mood = Mood::Neutral;
        }
    }

    /// Apply the effect of one discrete action.
    ///
    /// Every action, recognized or not, advances `last_interaction`
    /// and counts toward `total_interactions`. Only the four known
    /// actions touch energy, mood, or bond.
    pub fn apply_action(&mut self, action: Action, now: DateTime<Utc>) {
        match action {
            Action::Play => {
                self.energy = (self.energy - 10).max(0);
                self.mood = Mood::Excited;
                self.bond_level = (self.bond_level + 3).min(100);
            }
            Action::Feed => {
                self.energy = (self.energy + 20).min(100);
                self.mood = Mood::Happy;
                self.bond_level = (self.bond_level + 2).min(100);
            }
            Action::Chat => {
                self.mood = Mood::Thoughtful;
                self.bond_level = (self.bond_level + 2).min(100);
            }
            Action::Rest => {
                self.energy = (self.energy + 30).min(100);
                self.mood = Mood::Sleepy;
            }
            Action::Unrecognized => {}
        }

        self.last_interaction = now;
        self.total_interactions += 1;
    }
}
