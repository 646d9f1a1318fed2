pub mod ai;
pub mod game;
pub mod logging;
pub mod presentation;

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use gloo_timers::future::TimeoutFuture;
use log::LevelFilter;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{AiAgent, AiConfig, AiDecision, AiDifficulty, AiStrategy, GameAction};
pub use game::{
    DiceSource, DieFace, EventBus, GameEvent, GameObserver, GamePhase, GameState, GameStats,
    IntegrityError, PlayerId, RandomDice, RuleError, RuleResolution, ScoringEngine, ScriptedDice,
    StateSnapshot, VictoryState, WINNING_SCORE,
};
pub use presentation::{reveal_schedule, status_message, InputAction, RevealStep, RevealTiming};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    logging::init(LevelFilter::Info);
}

#[wasm_bindgen(js_name = "setLogLevel")]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = LevelFilter::from_str(level).map_err(serde_to_js_error)?;
    logging::init(filter);
    Ok(())
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn ai_config(difficulty: Option<String>, strategy: Option<String>) -> AiConfig {
    let difficulty = difficulty
        .as_deref()
        .and_then(|value| AiDifficulty::from_str(value).ok())
        .unwrap_or(AiDifficulty::Normal);
    let config = AiConfig::from_difficulty(difficulty);
    match strategy
        .as_deref()
        .and_then(|value| AiStrategy::from_str(value).ok())
    {
        Some(strategy) => config.with_strategy(strategy),
        None => config,
    }
}

#[derive(Serialize)]
struct TurnResponse {
    resolution: RuleResolution,
    reveal: Vec<RevealStep>,
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<TurnResponse>,
}

/// 浏览器页面持有的对局实例。
#[wasm_bindgen]
pub struct PigGame {
    engine: ScoringEngine,
    stats: Rc<RefCell<GameStats>>,
    timing: RevealTiming,
}

impl PigGame {
    fn respond(&self, events: Vec<GameEvent>) -> TurnResponse {
        let reveal = reveal_schedule(&events, &self.timing);
        TurnResponse {
            resolution: self.engine.resolution(events),
            reveal,
        }
    }

    fn respond_json(&self, events: Vec<GameEvent>) -> Result<String, JsValue> {
        serde_json::to_string(&self.respond(events)).map_err(serde_to_js_error)
    }

    fn apply_action(&mut self, action: GameAction) -> Result<Vec<GameEvent>, RuleError> {
        match action {
            GameAction::Roll => self.engine.roll(),
            GameAction::Hold => self.engine.hold(),
        }
    }
}

#[wasm_bindgen]
impl PigGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u32>) -> PigGame {
        let mut engine = match seed {
            Some(seed) => ScoringEngine::with_seed(u64::from(seed)),
            None => ScoringEngine::default(),
        };
        let stats = Rc::new(RefCell::new(GameStats::new()));
        engine.subscribe(Rc::clone(&stats));
        PigGame {
            engine,
            stats,
            timing: RevealTiming::default(),
        }
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        let events = self.engine.reset();
        self.respond_json(events)
    }

    pub fn roll(&mut self) -> Result<String, JsValue> {
        let events = self.engine.roll().map_err(to_js_error)?;
        self.respond_json(events)
    }

    pub fn hold(&mut self) -> Result<String, JsValue> {
        let events = self.engine.hold().map_err(to_js_error)?;
        self.respond_json(events)
    }

    /// Roll and hold keys are ignored once the game is over; the new-game key
    /// always resets.
    pub fn handle_key(&mut self, code: &str) -> Result<Option<String>, JsValue> {
        let events = match InputAction::from_key_code(code) {
            Some(InputAction::NewGame) => self.engine.reset(),
            Some(_) if self.engine.state().is_finished() => return Ok(None),
            Some(InputAction::Roll) => self.engine.roll().map_err(to_js_error)?,
            Some(InputAction::Hold) => self.engine.hold().map_err(to_js_error)?,
            None => return Ok(None),
        };
        self.respond_json(events).map(Some)
    }

    pub fn is_active(&self) -> bool {
        self.engine.state().is_active()
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.engine.state()).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.engine.load_state(state).map_err(to_js_error)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.engine.snapshot()).map_err(JsValue::from)
    }

    pub fn stats(&self) -> Result<JsValue, JsValue> {
        to_value(&*self.stats.borrow()).map_err(JsValue::from)
    }

    pub fn debug_set_score(&mut self, player: u8, score: u32) -> Result<String, JsValue> {
        let events = self
            .engine
            .set_total_score(player, score)
            .map_err(to_js_error)?;
        self.respond_json(events)
    }

    pub fn set_reveal_timing(&mut self, json: &str) -> Result<(), JsValue> {
        self.timing = serde_json::from_str(json).map_err(serde_to_js_error)?;
        Ok(())
    }

    pub fn apply_ai_move(
        &mut self,
        difficulty: Option<String>,
        strategy: Option<String>,
    ) -> Result<String, JsValue> {
        let mut agent = AiAgent::new(ai_config(difficulty, strategy));
        let player = self.engine.state().active_player;
        let decision = agent.decide_action(self.engine.state(), player);

        let applied = match decision.action {
            Some(action) => {
                let events = self.apply_action(action).map_err(to_js_error)?;
                Some(self.respond(events))
            }
            None => None,
        };

        let response = AiMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    pub fn think_ai(
        &self,
        difficulty: Option<String>,
        strategy: Option<String>,
        delay_ms: Option<u32>,
    ) -> Promise {
        let state = self.engine.state().clone();
        let config = ai_config(difficulty, strategy);
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = AiAgent::new(config);
            let decision = agent.decide_action(&state, state.active_player);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 返回一局新游戏的初始状态。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::new()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))
}

/// 骰面对应的 Unicode 字符，超出 1..=6 时返回空。
#[wasm_bindgen(js_name = "dieFace")]
pub fn die_face(value: u8) -> Option<String> {
    DieFace::new(value).map(|face| face.glyph().to_string())
}

#[wasm_bindgen(js_name = "keyAction")]
pub fn key_action(code: &str) -> Option<String> {
    InputAction::from_key_code(code).map(|action| action.as_str().to_string())
}

#[wasm_bindgen(js_name = "winnerBanner")]
pub fn winner_banner(player: u8) -> Option<String> {
    PlayerId::try_from(player)
        .ok()
        .map(presentation::winner_banner)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_game() -> PigGame {
        PigGame::new(Some(9))
    }

    #[test]
    fn new_key_resets_finished_game() {
        let mut game = seeded_game();
        game.engine
            .set_total_score(1, 150)
            .expect("override should succeed");
        assert!(!game.is_active());

        assert_eq!(game.handle_key("Space").expect("ignored key"), None);
        assert_eq!(game.handle_key("KeyH").expect("ignored key"), None);
        assert_eq!(game.handle_key("KeyZ").expect("unmapped key"), None);

        let json = game
            .handle_key("KeyN")
            .expect("reset should succeed")
            .expect("reset should produce a response");
        assert!(json.contains(r#""type":"Reset""#));
        assert!(game.is_active());
        assert_eq!(game.stats.borrow().player1_wins, 1);
    }

    #[test]
    fn roll_key_produces_reveal_schedule() {
        let mut game = seeded_game();
        let json = game
            .handle_key("Enter")
            .expect("roll should succeed")
            .expect("roll should produce a response");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["reveal"][0]["delay_ms"], 500);
        assert_eq!(value["reveal"][0]["event"]["type"], "Rolled");
        assert_eq!(game.stats.borrow().rolls_this_game, 1);
    }

    #[test]
    fn state_json_round_trips_through_loader() {
        let mut game = seeded_game();
        let json = game.state_json().expect("state should serialize");
        game.set_state_json(&json).expect("state should load");
        assert_eq!(game.engine.state(), &GameState::new());
    }

    #[test]
    fn ai_move_applies_an_opening_roll() {
        let mut game = seeded_game();
        let json = game
            .apply_ai_move(Some("expert".into()), None)
            .expect("ai move should apply");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["decision"]["action"]["type"], "Roll");
        assert_eq!(
            value["applied"]["resolution"]["events"][0]["type"],
            "Rolled"
        );
        assert_eq!(game.stats.borrow().rolls_this_game, 1);
    }

    #[test]
    fn ai_config_falls_back_to_normal() {
        let config = ai_config(Some("nonsense".into()), None);
        assert_eq!(config.strategy, AiStrategy::Cautious);
        let config = ai_config(Some("expert".into()), Some("aggro".into()));
        assert_eq!(config.strategy, AiStrategy::Aggressive);
        assert_eq!(config.hold_at, 25);
    }

    #[test]
    fn glyph_and_key_helpers() {
        assert_eq!(die_face(3).as_deref(), Some("⚂"));
        assert_eq!(die_face(0), None);
        assert_eq!(key_action("KeyH").as_deref(), Some("hold"));
        assert_eq!(winner_banner(3), None);
    }
}
