//! 表现层契约：按键映射、状态文本以及事件的揭示时间表。
//!
//! 引擎同步地应用状态变化；页面依据这里生成的时间表决定何时展示。

use serde::{Deserialize, Serialize};

use crate::game::{GameEvent, PlayerId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputAction {
    Roll,
    Hold,
    NewGame,
}

impl InputAction {
    /// Maps a `KeyboardEvent.code` to a game intent.
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "Space" | "Enter" => Some(InputAction::Roll),
            "KeyH" => Some(InputAction::Hold),
            "KeyN" => Some(InputAction::NewGame),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InputAction::Roll => "roll",
            InputAction::Hold => "hold",
            InputAction::NewGame => "newgame",
        }
    }
}

/// 各类揭示动作的延迟（毫秒）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RevealTiming {
    pub roll_animation_ms: u32,
    pub bust_switch_ms: u32,
    pub hold_switch_ms: u32,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            roll_animation_ms: 500,
            bust_switch_ms: 1500,
            hold_switch_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevealStep {
    /// Delay relative to the previous step.
    pub delay_ms: u32,
    pub event: GameEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub fn turn_message(player: PlayerId) -> String {
    format!("{player}'s Turn")
}

pub fn status_message(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::Reset => Some(turn_message(PlayerId::One)),
        GameEvent::Rolled { player, outcome } if !outcome.is_bust() => Some(format!(
            "{player} rolled a {outcome}! Keep rolling or hold?"
        )),
        GameEvent::Bust { player, .. } => Some(format!("{player} rolled a 1! Turn over!")),
        GameEvent::TurnHeld { player, banked, .. } => {
            Some(format!("{player} held {banked} points!"))
        }
        GameEvent::TurnChanged { active_player } => Some(turn_message(*active_player)),
        GameEvent::GameOver {
            winner,
            final_score,
        } => Some(format!("{winner} won with {final_score} points!")),
        _ => None,
    }
}

pub fn winner_banner(winner: PlayerId) -> String {
    format!("🎉 {winner} Wins! 🎉")
}

pub fn reveal_schedule(events: &[GameEvent], timing: &RevealTiming) -> Vec<RevealStep> {
    let mut previous: Option<&GameEvent> = None;
    events
        .iter()
        .map(|event| {
            let delay_ms = match (previous, event) {
                (_, GameEvent::Rolled { .. }) => timing.roll_animation_ms,
                (Some(GameEvent::Bust { .. }), GameEvent::TurnChanged { .. }) => {
                    timing.bust_switch_ms
                }
                (Some(GameEvent::TurnHeld { .. }), GameEvent::TurnChanged { .. }) => {
                    timing.hold_switch_ms
                }
                _ => 0,
            };
            previous = Some(event);
            RevealStep {
                delay_ms,
                event: event.clone(),
                status: status_message(event),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::DieFace;

    #[test]
    fn key_codes_map_to_actions() {
        assert_eq!(InputAction::from_key_code("Space"), Some(InputAction::Roll));
        assert_eq!(InputAction::from_key_code("Enter"), Some(InputAction::Roll));
        assert_eq!(InputAction::from_key_code("KeyH"), Some(InputAction::Hold));
        assert_eq!(InputAction::from_key_code("KeyN"), Some(InputAction::NewGame));
        assert_eq!(InputAction::from_key_code("KeyQ"), None);
    }

    #[test]
    fn status_messages_match_page_copy() {
        let six = DieFace::new(6).expect("valid face");
        assert_eq!(
            status_message(&GameEvent::Rolled {
                player: PlayerId::Two,
                outcome: six,
            })
            .as_deref(),
            Some("Player 2 rolled a 6! Keep rolling or hold?")
        );
        assert_eq!(
            status_message(&GameEvent::Rolled {
                player: PlayerId::Two,
                outcome: DieFace::ONE,
            }),
            None
        );
        assert_eq!(
            status_message(&GameEvent::Reset).as_deref(),
            Some("Player 1's Turn")
        );
        assert_eq!(
            status_message(&GameEvent::GameOver {
                winner: PlayerId::One,
                final_score: 101,
            })
            .as_deref(),
            Some("Player 1 won with 101 points!")
        );
        assert_eq!(winner_banner(PlayerId::Two), "🎉 Player 2 Wins! 🎉");
    }

    #[test]
    fn bust_waits_before_switching() {
        let events = vec![
            GameEvent::Rolled {
                player: PlayerId::One,
                outcome: DieFace::ONE,
            },
            GameEvent::Bust {
                player: PlayerId::One,
                outcome: DieFace::ONE,
                lost: 9,
            },
            GameEvent::TurnChanged {
                active_player: PlayerId::Two,
            },
        ];
        let steps = reveal_schedule(&events, &RevealTiming::default());
        let delays: Vec<u32> = steps.iter().map(|step| step.delay_ms).collect();
        assert_eq!(delays, vec![500, 0, 1500]);
        assert_eq!(
            steps[1].status.as_deref(),
            Some("Player 1 rolled a 1! Turn over!")
        );
        assert_eq!(steps[2].status.as_deref(), Some("Player 2's Turn"));
    }

    #[test]
    fn hold_uses_hold_delay() {
        let events = vec![
            GameEvent::TurnHeld {
                player: PlayerId::Two,
                banked: 12,
                total_score: 40,
            },
            GameEvent::TurnChanged {
                active_player: PlayerId::One,
            },
        ];
        let timing = RevealTiming {
            hold_switch_ms: 250,
            ..RevealTiming::default()
        };
        let delays: Vec<u32> = reveal_schedule(&events, &timing)
            .iter()
            .map(|step| step.delay_ms)
            .collect();
        assert_eq!(delays, vec![0, 250]);
    }

    #[test]
    fn timing_fills_missing_fields() {
        let timing: RevealTiming =
            serde_json::from_str(r#"{"bust_switch_ms": 10}"#).expect("timing should parse");
        assert_eq!(timing.bust_switch_ms, 10);
        assert_eq!(timing.roll_animation_ms, 500);
    }
}
