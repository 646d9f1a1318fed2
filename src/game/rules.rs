use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    dice::{DiceSource, RandomDice},
    events::{EventBus, GameObserver},
    state::{
        GameEvent, GamePhase, GameState, IntegrityError, PlayerId, StateSnapshot, VictoryState,
        WINNING_SCORE,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("the game is over, start a new game first")]
    InactiveGame,
    #[error("player {player_id} does not exist")]
    PlayerNotFound { player_id: u8 },
    #[error("state integrity violated: {error}")]
    IntegrityViolation { error: IntegrityError },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victory: Option<VictoryState>,
}

impl RuleResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let victory = state.outcome;
        Self {
            state,
            events,
            victory,
        }
    }
}

/// 计分引擎：持有唯一的游戏状态，并执行掷骰、保留、换人等规则。
pub struct ScoringEngine<D = RandomDice> {
    state: GameState,
    dice: D,
    bus: EventBus,
}

impl ScoringEngine<RandomDice> {
    pub fn with_seed(seed: u64) -> Self {
        Self::new(RandomDice::with_seed(seed))
    }
}

impl Default for ScoringEngine<RandomDice> {
    fn default() -> Self {
        Self::new(RandomDice::new())
    }
}

impl<D: DiceSource> ScoringEngine<D> {
    pub fn new(dice: D) -> Self {
        Self {
            state: GameState::new(),
            dice,
            bus: EventBus::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl GameObserver + 'static) {
        self.bus.subscribe(observer);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn resolution(&self, events: Vec<GameEvent>) -> RuleResolution {
        RuleResolution::new(self.state.clone(), events)
    }

    fn emit(&mut self, events: &mut Vec<GameEvent>, event: GameEvent) {
        self.bus.publish(&event);
        events.push(event);
    }

    fn ensure_active(&self) -> Result<(), RuleError> {
        if self.state.is_finished() {
            warn!("rejected action: game already won");
            return Err(RuleError::InactiveGame);
        }
        Ok(())
    }

    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.state = GameState::new();
        info!("new game started");
        let mut events = Vec::new();
        self.emit(&mut events, GameEvent::Reset);
        events
    }

    pub fn roll(&mut self) -> Result<Vec<GameEvent>, RuleError> {
        self.ensure_active()?;
        let player = self.state.active_player;
        let outcome = self.dice.roll();
        debug!("{player} rolled {outcome}");

        let mut events = Vec::new();
        self.emit(&mut events, GameEvent::Rolled { player, outcome });

        if outcome.is_bust() {
            let lost = std::mem::take(self.state.round_score_mut(player));
            debug!("{player} bust, losing {lost} points");
            self.emit(
                &mut events,
                GameEvent::Bust {
                    player,
                    outcome,
                    lost,
                },
            );
            self.switch_player(&mut events);
        } else {
            let round = self.state.round_score_mut(player);
            *round = round.saturating_add(outcome.points());
            let round_score = *round;
            self.emit(
                &mut events,
                GameEvent::Accumulated {
                    player,
                    round_score,
                },
            );
        }

        Ok(events)
    }

    pub fn hold(&mut self) -> Result<Vec<GameEvent>, RuleError> {
        self.ensure_active()?;
        let player = self.state.active_player;
        let banked = std::mem::take(self.state.round_score_mut(player));
        let total = self.state.total_score_mut(player);
        *total = total.saturating_add(banked);
        let total_score = *total;
        debug!("{player} held {banked} points, total {total_score}");

        let mut events = Vec::new();
        if total_score >= WINNING_SCORE {
            self.finish(&mut events, player);
        } else {
            self.emit(
                &mut events,
                GameEvent::TurnHeld {
                    player,
                    banked,
                    total_score,
                },
            );
            self.switch_player(&mut events);
        }

        Ok(events)
    }

    fn switch_player(&mut self, events: &mut Vec<GameEvent>) {
        let outgoing = self.state.active_player;
        *self.state.round_score_mut(outgoing) = 0;
        let active_player = outgoing.opponent();
        self.state.active_player = active_player;
        self.emit(events, GameEvent::TurnChanged { active_player });
    }

    fn finish(&mut self, events: &mut Vec<GameEvent>, winner: PlayerId) {
        let victory = self.state.declare_victory(winner);
        info!("{} wins with {} points", victory.winner, victory.final_score);
        self.emit(
            events,
            GameEvent::GameOver {
                winner: victory.winner,
                final_score: victory.final_score,
            },
        );
    }

    /// Diagnostic override of a player's banked score. Reaching the winning
    /// score through the override ends the game.
    pub fn set_total_score(
        &mut self,
        player_id: u8,
        score: u32,
    ) -> Result<Vec<GameEvent>, RuleError> {
        let player =
            PlayerId::try_from(player_id).map_err(|_| RuleError::PlayerNotFound { player_id })?;
        self.ensure_active()?;
        *self.state.total_score_mut(player) = score;
        warn!("debug override: {player} total set to {score}");

        let mut events = Vec::new();
        self.emit(
            &mut events,
            GameEvent::ScoreOverridden {
                player,
                total_score: score,
            },
        );
        if score >= WINNING_SCORE {
            self.finish(&mut events, player);
        }
        Ok(events)
    }

    pub fn load_state(&mut self, state: GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })?;
        self.state = state;
        Ok(())
    }
}
