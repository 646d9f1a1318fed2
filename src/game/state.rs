use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dice::DieFace;

/// 获胜所需的总分。
pub const WINNING_SCORE: u32 = 100;

/// 玩家标识，序列化为 1 或 2。
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerId {
    #[default]
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub fn number(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = IntegrityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerId::One),
            2 => Ok(PlayerId::Two),
            player_id => Err(IntegrityError::InvalidPlayerIndex { player_id }),
        }
    }
}

impl From<PlayerId> for u8 {
    fn from(player: PlayerId) -> Self {
        player.number()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VictoryState {
    pub winner: PlayerId,
    pub final_score: u32,
}

/// 对局所处的阶段，由状态推导而来。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GamePhase {
    Playing { active_player: PlayerId },
    GameOver { winner: PlayerId },
}

/// 游戏事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    Reset,
    Rolled {
        player: PlayerId,
        outcome: DieFace,
    },
    Accumulated {
        player: PlayerId,
        round_score: u32,
    },
    Bust {
        player: PlayerId,
        outcome: DieFace,
        lost: u32,
    },
    TurnHeld {
        player: PlayerId,
        banked: u32,
        total_score: u32,
    },
    TurnChanged {
        active_player: PlayerId,
    },
    GameOver {
        winner: PlayerId,
        final_score: u32,
    },
    ScoreOverridden {
        player: PlayerId,
        total_score: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[error("player {player_id} does not exist")]
    InvalidPlayerIndex { player_id: u8 },
    #[error("inactive {player} holds a round score of {value}")]
    RoundScoreOnInactivePlayer { player: PlayerId, value: u32 },
    #[error("{player} reached {total_score} but no winner was declared")]
    WinnerNotDeclared { player: PlayerId, total_score: u32 },
    #[error("declared winner {winner} only has {total_score} points")]
    WinnerBelowThreshold { winner: PlayerId, total_score: u32 },
    #[error("recorded final score {final_score} differs from {winner}'s total {total_score}")]
    FinalScoreMismatch {
        winner: PlayerId,
        final_score: u32,
        total_score: u32,
    },
    #[error("losing {player} also reached {total_score} points")]
    LoserPastThreshold { player: PlayerId, total_score: u32 },
    #[error("{player} total {total_score} plus round {round_score} overflows")]
    ScoreOverflow {
        player: PlayerId,
        total_score: u32,
        round_score: u32,
    },
}

/// 调试用的状态投影。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateSnapshot {
    pub current_player: PlayerId,
    pub total_scores: [u32; 2],
    pub current_scores: [u32; 2],
    pub game_active: bool,
}

/// 游戏整体状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub active_player: PlayerId,
    #[serde(default)]
    pub total_scores: [u32; 2],
    #[serde(default)]
    pub round_scores: [u32; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<VictoryState>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            active_player: PlayerId::One,
            total_scores: [0; 2],
            round_scores: [0; 2],
            outcome: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn phase(&self) -> GamePhase {
        match self.outcome {
            Some(victory) => GamePhase::GameOver {
                winner: victory.winner,
            },
            None => GamePhase::Playing {
                active_player: self.active_player,
            },
        }
    }

    pub fn total_score(&self, player: PlayerId) -> u32 {
        self.total_scores[player.index()]
    }

    pub fn round_score(&self, player: PlayerId) -> u32 {
        self.round_scores[player.index()]
    }

    pub fn active_round_score(&self) -> u32 {
        self.round_score(self.active_player)
    }

    pub(crate) fn total_score_mut(&mut self, player: PlayerId) -> &mut u32 {
        &mut self.total_scores[player.index()]
    }

    pub(crate) fn round_score_mut(&mut self, player: PlayerId) -> &mut u32 {
        &mut self.round_scores[player.index()]
    }

    pub fn declare_victory(&mut self, winner: PlayerId) -> VictoryState {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let victory = VictoryState {
            winner,
            final_score: self.total_score(winner),
        };
        self.outcome = Some(victory);
        victory
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            current_player: self.active_player,
            total_scores: self.total_scores,
            current_scores: self.round_scores,
            game_active: self.is_active(),
        }
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let idle = self.active_player.opponent();
        let idle_round = self.round_score(idle);
        if idle_round != 0 {
            return Err(IntegrityError::RoundScoreOnInactivePlayer {
                player: idle,
                value: idle_round,
            });
        }

        let player = self.active_player;
        let (total_score, round_score) = (self.total_score(player), self.round_score(player));
        if total_score.checked_add(round_score).is_none() {
            return Err(IntegrityError::ScoreOverflow {
                player,
                total_score,
                round_score,
            });
        }

        match self.outcome {
            Some(victory) => {
                let winner = victory.winner;
                let total_score = self.total_score(winner);
                if total_score < WINNING_SCORE {
                    return Err(IntegrityError::WinnerBelowThreshold {
                        winner,
                        total_score,
                    });
                }
                if victory.final_score != total_score {
                    return Err(IntegrityError::FinalScoreMismatch {
                        winner,
                        final_score: victory.final_score,
                        total_score,
                    });
                }
                let loser = winner.opponent();
                if self.total_score(loser) >= WINNING_SCORE {
                    return Err(IntegrityError::LoserPastThreshold {
                        player: loser,
                        total_score: self.total_score(loser),
                    });
                }
            }
            None => {
                if let Some(player) = PlayerId::ALL
                    .into_iter()
                    .find(|player| self.total_score(*player) >= WINNING_SCORE)
                {
                    return Err(IntegrityError::WinnerNotDeclared {
                        player,
                        total_score: self.total_score(player),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
