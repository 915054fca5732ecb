//! Routing policy: which models answer by default in each mode, and
//! which model a low-confidence round escalates to.
//!
//! Pure functions over static tier tables. The tiers mirror the
//! OpenRouter catalog spread the product ships with; a deployment can
//! still address other models explicitly per thread.

use crate::core::model::Model;
use crate::orchestration::mode::Mode;

const CHEAP: [Model; 2] = [Model::ClaudeHaiku3, Model::Gpt4oMini];

const MID: [Model; 3] = [Model::ClaudeSonnet35, Model::Gpt4o, Model::Grok4];

const PREMIUM: [Model; 3] = [Model::Gpt41, Model::Gpt41Mini, Model::ClaudeSonnet35];

/// Default participant list for a mode, in fan-out order.
///
/// Cheap models for the low tiers, a cheap+mid mix for balanced, mid and
/// premium for deluxe, and a four-tier spread for council.
pub fn default_participants(mode: Mode) -> Vec<Model> {
    match mode {
        Mode::Eco | Mode::Budget => CHEAP.to_vec(),
        Mode::Balanced => vec![
            CHEAP[0].clone(),
            MID[0].clone(),
            MID[1].clone(),
        ],
        Mode::Deluxe => vec![
            MID[0].clone(),
            MID[1].clone(),
            PREMIUM[0].clone(),
            CHEAP[0].clone(),
        ],
        Mode::Council => vec![
            CHEAP[0].clone(),
            MID[0].clone(),
            MID[1].clone(),
            PREMIUM[0].clone(),
        ],
    }
}

/// Escalation candidate for a mode.
///
/// Eco never escalates. The other modes pick the next tier up, falling
/// back through the mid → premium priority chain when a tier entry is
/// unavailable.
pub fn escalation_candidate(mode: Mode) -> Option<Model> {
    match mode {
        Mode::Eco => None,
        Mode::Budget => MID.first().cloned(),
        Mode::Balanced => MID.get(1).cloned().or_else(|| PREMIUM.first().cloned()),
        Mode::Deluxe | Mode::Council => {
            PREMIUM.first().cloned().or_else(|| MID.first().cloned())
        }
    }
}
