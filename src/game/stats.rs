use serde::{Deserialize, Serialize};

use super::events::GameObserver;
use super::state::{GameEvent, PlayerId};

/// 对局统计，作为观察者挂在引擎上。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStats {
    pub total_games: u32,
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub rolls_this_game: u32,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wins(&self, player: PlayerId) -> u32 {
        match player {
            PlayerId::One => self.player1_wins,
            PlayerId::Two => self.player2_wins,
        }
    }
}

impl GameObserver for GameStats {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Reset => self.rolls_this_game = 0,
            GameEvent::Rolled { .. } => self.rolls_this_game += 1,
            GameEvent::GameOver { winner, .. } => {
                self.total_games += 1;
                match winner {
                    PlayerId::One => self.player1_wins += 1,
                    PlayerId::Two => self.player2_wins += 1,
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::DieFace;

    #[test]
    fn counts_rolls_and_clears_them_on_reset() {
        let mut stats = GameStats::new();
        let rolled = GameEvent::Rolled {
            player: PlayerId::One,
            outcome: DieFace::ONE,
        };
        stats.on_event(&rolled);
        stats.on_event(&rolled);
        assert_eq!(stats.rolls_this_game, 2);

        stats.on_event(&GameEvent::Reset);
        assert_eq!(stats.rolls_this_game, 0);
    }

    #[test]
    fn game_over_credits_the_winner() {
        let mut stats = GameStats::new();
        stats.on_event(&GameEvent::GameOver {
            winner: PlayerId::Two,
            final_score: 103,
        });
        stats.on_event(&GameEvent::TurnChanged {
            active_player: PlayerId::One,
        });

        assert_eq!(stats.total_games, 1);
        assert_eq!(stats.wins(PlayerId::Two), 1);
        assert_eq!(stats.wins(PlayerId::One), 0);
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let json = serde_json::to_value(GameStats::new()).expect("stats should serialize");
        assert_eq!(json["player1_wins"], 0);
        assert_eq!(json["rolls_this_game"], 0);
    }
}
