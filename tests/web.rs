//! Browser tests, run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use pig_dice::{validate_state, GameState, PigGame, StateSnapshot};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn finished_game_throws_inactive_error() {
    let mut game = PigGame::new(Some(1));
    game.debug_set_score(2, 100).expect("override should succeed");

    let error = game.roll().expect_err("roll should be rejected");
    let kind = error_type(&error);
    assert_eq!(kind.as_deref(), Some("InactiveGame"));

    let snapshot: StateSnapshot =
        serde_wasm_bindgen::from_value(game.snapshot().expect("snapshot")).expect("snapshot shape");
    assert!(!snapshot.game_active);
    assert_eq!(snapshot.total_scores, [0, 100]);
}

#[wasm_bindgen_test]
fn validate_state_rejects_idle_round_score() {
    let mut state = GameState::new();
    state.total_scores = [10, 10];
    state.round_scores = [0, 5];
    let state = serde_wasm_bindgen::to_value(&state).expect("state value");
    assert!(validate_state(state).is_err());
}

fn error_type(value: &JsValue) -> Option<String> {
    let parsed: serde_json::Value = serde_wasm_bindgen::from_value(value.clone()).ok()?;
    parsed["type"].as_str().map(str::to_string)
}
