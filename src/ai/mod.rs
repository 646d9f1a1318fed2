//! AI 模块（电脑对手的掷骰/保留策略）。

pub mod strategy;

pub use strategy::{AiAgent, AiConfig, AiDecision, AiDifficulty, AiStrategy, GameAction};
