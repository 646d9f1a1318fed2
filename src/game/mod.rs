//! 游戏核心逻辑模块（状态、骰子、计分引擎、事件与统计）。

pub mod dice;
pub mod events;
pub mod rules;
pub mod state;
pub mod stats;

pub use dice::{DiceSource, DieFace, InvalidDieFace, RandomDice, ScriptedDice};
pub use events::{EventBus, GameObserver};
pub use rules::{RuleError, RuleResolution, ScoringEngine};
pub use state::{
    GameEvent,
    GamePhase,
    GameState,
    IntegrityError,
    PlayerId,
    StateSnapshot,
    VictoryState,
    WINNING_SCORE,
};
pub use stats::GameStats;
