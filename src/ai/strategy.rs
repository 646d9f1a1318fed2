use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::{GameState, PlayerId, WINNING_SCORE};

/// Opponent score from which `Adaptive` stops banking and plays for the win.
const ENDGAME_SCORE: u32 = 71;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameAction {
    Roll,
    Hold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiStrategy {
    Cautious,
    Classic,
    Aggressive,
    Adaptive,
    Random,
}

impl AiStrategy {
    fn base_target(self) -> u32 {
        match self {
            AiStrategy::Cautious => 15,
            AiStrategy::Classic | AiStrategy::Adaptive | AiStrategy::Random => 20,
            AiStrategy::Aggressive => 25,
        }
    }
}

impl FromStr for AiStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cautious" | "safe" => Ok(AiStrategy::Cautious),
            "classic" | "hold20" => Ok(AiStrategy::Classic),
            "aggressive" | "aggro" => Ok(AiStrategy::Aggressive),
            "adaptive" | "balanced" => Ok(AiStrategy::Adaptive),
            "random" => Ok(AiStrategy::Random),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "normal" | "medium" => Ok(AiDifficulty::Normal),
            "hard" => Ok(AiDifficulty::Hard),
            "expert" | "extreme" => Ok(AiDifficulty::Expert),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub hold_at: u32,
    pub randomness: f64,
    pub strategy: AiStrategy,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        match difficulty {
            AiDifficulty::Easy => Self {
                hold_at: AiStrategy::Random.base_target(),
                randomness: 1.0,
                strategy: AiStrategy::Random,
            },
            AiDifficulty::Normal => Self {
                hold_at: AiStrategy::Cautious.base_target(),
                randomness: 0.5,
                strategy: AiStrategy::Cautious,
            },
            AiDifficulty::Hard => Self {
                hold_at: AiStrategy::Classic.base_target(),
                randomness: 0.2,
                strategy: AiStrategy::Classic,
            },
            AiDifficulty::Expert => Self {
                hold_at: AiStrategy::Adaptive.base_target(),
                randomness: 0.0,
                strategy: AiStrategy::Adaptive,
            },
        }
    }

    pub fn with_strategy(mut self, strategy: AiStrategy) -> Self {
        self.strategy = strategy;
        self.hold_at = strategy.base_target();
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::Normal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<GameAction>,
    pub target: u32,
    pub round_score: u32,
    pub strategy: AiStrategy,
}

pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn decide_action(&mut self, state: &GameState, player_id: PlayerId) -> AiDecision {
        let strategy = self.config.strategy;
        let round_score = state.round_score(player_id);
        let target = self.target_for(state, player_id);
        let decision = |action| AiDecision {
            action,
            target,
            round_score,
            strategy,
        };

        if state.is_finished() || state.active_player != player_id {
            return decision(None);
        }
        if round_score == 0 {
            return decision(Some(GameAction::Roll));
        }
        if state.total_score(player_id).saturating_add(round_score) >= WINNING_SCORE {
            return decision(Some(GameAction::Hold));
        }

        let action = if strategy == AiStrategy::Random {
            if self.rng.gen_bool(0.5) {
                GameAction::Hold
            } else {
                GameAction::Roll
            }
        } else if round_score >= target {
            GameAction::Hold
        } else {
            GameAction::Roll
        };
        decision(Some(action))
    }

    /// Round score at which the agent banks, never above what it needs to win.
    fn target_for(&mut self, state: &GameState, player_id: PlayerId) -> u32 {
        let own = state.total_score(player_id);
        let opponent = state.total_score(player_id.opponent());
        let needed = WINNING_SCORE.saturating_sub(own).max(1);

        let mut target = i64::from(self.config.hold_at);
        if self.config.strategy == AiStrategy::Adaptive {
            if opponent >= ENDGAME_SCORE {
                return needed;
            }
            target += (i64::from(opponent) - i64::from(own)) / 8;
        }
        target += self.random_noise();

        let target = target.clamp(1, i64::from(needed));
        u32::try_from(target).unwrap_or(needed)
    }

    fn random_noise(&mut self) -> i64 {
        if self.config.randomness <= 0.0 {
            0
        } else {
            ((self.rng.gen::<f64>() - 0.5) * 8.0 * self.config.randomness).round() as i64
        }
    }
}
