//! Mode definitions for the reply coordinator.
//!
//! [`Mode`] is the single user-facing cost axis. Each mode resolves to a
//! static [`ModeProfile`] that is the sole source of truth for sampling
//! parameters, cache lifetime, and the orchestration policy bits
//! (escalation eligibility and threshold, debate eligibility). Adding a
//! mode means adding a profile row, not new branches in the coordinator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Generation mode, with monotonically increasing cost from eco to
/// deluxe; council trades per-model budget for a wider participant spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Eco,
    Budget,
    #[default]
    Balanced,
    Deluxe,
    Council,
}

/// Static per-mode configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    /// Sampling temperature, in [0, 1]
    pub temperature: f32,
    /// Upper bound on generated tokens per reply
    pub max_tokens: u32,
    /// Lifetime of cached responses generated under this mode
    pub cache_ttl: Duration,
    /// Whether low mean confidence may trigger a single escalation call
    pub escalation_eligible: bool,
    /// Mean confidence strictly below this triggers escalation
    pub escalation_threshold: f32,
    /// Whether a debate round runs after the base fan-out
    pub debate_eligible: bool,
}

const ECO: ModeProfile = ModeProfile {
    temperature: 0.2,
    max_tokens: 160,
    cache_ttl: Duration::from_secs(15 * 60),
    escalation_eligible: false,
    escalation_threshold: 0.35,
    debate_eligible: false,
};

const BUDGET: ModeProfile = ModeProfile {
    temperature: 0.5,
    max_tokens: 256,
    cache_ttl: Duration::from_secs(15 * 60),
    escalation_eligible: true,
    escalation_threshold: 0.35,
    debate_eligible: false,
};

const BALANCED: ModeProfile = ModeProfile {
    temperature: 0.7,
    max_tokens: 400,
    cache_ttl: Duration::from_secs(10 * 60),
    escalation_eligible: true,
    escalation_threshold: 0.35,
    debate_eligible: false,
};

const DELUXE: ModeProfile = ModeProfile {
    temperature: 0.8,
    max_tokens: 600,
    cache_ttl: Duration::from_secs(5 * 60),
    escalation_eligible: false,
    escalation_threshold: 0.35,
    debate_eligible: false,
};

const COUNCIL: ModeProfile = ModeProfile {
    temperature: 0.7,
    max_tokens: 300,
    cache_ttl: Duration::from_secs(10 * 60),
    escalation_eligible: false,
    escalation_threshold: 0.35,
    debate_eligible: true,
};

impl Mode {
    /// Resolve an optional mode string, failing open to [`Mode::Balanced`].
    ///
    /// Unknown values are not an error: a caller sending a mode this
    /// version does not know about still gets a usable configuration.
    pub fn resolve(value: Option<&str>) -> Mode {
        value
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// The static profile for this mode
    pub fn profile(&self) -> &'static ModeProfile {
        match self {
            Mode::Eco => &ECO,
            Mode::Budget => &BUDGET,
            Mode::Balanced => &BALANCED,
            Mode::Deluxe => &DELUXE,
            Mode::Council => &COUNCIL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Eco => "eco",
            Mode::Budget => "budget",
            Mode::Balanced => "balanced",
            Mode::Deluxe => "deluxe",
            Mode::Council => "council",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Eco => "Eco",
            Mode::Budget => "Budget",
            Mode::Balanced => "Balanced",
            Mode::Deluxe => "Deluxe",
            Mode::Council => "Council",
        }
    }

    pub fn all() -> [Mode; 5] {
        [
            Mode::Eco,
            Mode::Budget,
            Mode::Balanced,
            Mode::Deluxe,
            Mode::Council,
        ]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eco" => Ok(Mode::Eco),
            "budget" => Ok(Mode::Budget),
            "balanced" => Ok(Mode::Balanced),
            "deluxe" => Ok(Mode::Deluxe),
            "council" => Ok(Mode::Council),
            _ => Err(format!("Invalid mode: {}", s)),
        }
    }
}
