//! Game controller.
//!
//! Owns the single [`GameState`] behind a thread local and wires DOM events,
//! the 100ms countdown interval, scoring, audio and persistence together.
//! Event closures never nest state borrows: each takes one fresh borrow and
//! hands `&mut GameState` to a plain function.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Document, Event, HtmlSelectElement, KeyboardEvent};

use crate::audio::{self, EffectKind};
use crate::prompt;
use crate::ranking::{self, RankingEntry, Rankings};
use crate::romaji;
use crate::session::Session;
use crate::storage::{self, BestOutcome, HighScores};
use crate::ui;
use crate::Difficulty;

const RUN_SECONDS: f64 = 60.0;
const TICK_MS: i32 = 100;

struct GameState {
    running: bool,
    difficulty: Difficulty,
    session: Session,
    time_remaining: f64,
    end_timestamp: f64,
    timer_id: Option<i32>,
    // Kept alive while its interval can still fire; replaced on the next run.
    _tick_closure: Option<Closure<dyn FnMut()>>,
    // Normalized reading of the prompt currently on screen.
    expected: String,
    sound_enabled: bool,
    bgm_enabled: bool,
    high_scores: HighScores,
    rankings: Rankings,
}

thread_local! {
    static GAME: RefCell<Option<GameState>> = RefCell::new(None);
}

/// Build the UI if needed, load stored scores and attach all event handlers.
/// Safe to call more than once; later calls are no-ops.
pub fn start() -> Result<(), JsValue> {
    let document = document()?;
    let already = GAME.with(|game| game.borrow().is_some());
    if already {
        return Ok(());
    }

    ui::ensure_ui(&document)?;

    let difficulty = default_difficulty(&document);
    let state = GameState {
        running: false,
        difficulty,
        session: Session::new(),
        time_remaining: RUN_SECONDS,
        end_timestamp: 0.0,
        timer_id: None,
        _tick_closure: None,
        expected: String::new(),
        sound_enabled: true,
        bgm_enabled: true,
        high_scores: storage::load_high_scores(),
        rankings: storage::load_rankings(),
    };

    ui::update_stats(&document, state.time_remaining, &state.session);
    ui::update_personal_best(&document, state.high_scores.get(difficulty));
    ui::update_start_button(&document, false);
    ui::reset_feedback(&document);
    ui::update_ranking_description(&document, difficulty);
    ui::render_ranking_table(&document, state.rankings.bucket(difficulty))?;

    GAME.with(|game| *game.borrow_mut() = Some(state));

    bind_events(&document)
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

// The host page can preselect a difficulty via
// `<body data-default-difficulty="hard">`.
fn default_difficulty(document: &Document) -> Difficulty {
    document
        .body()
        .and_then(|body| body.get_attribute("data-default-difficulty"))
        .and_then(|key| Difficulty::from_key(&key))
        .unwrap_or(Difficulty::Easy)
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now())
        .unwrap_or(0.0)
}

fn with_state(f: impl FnOnce(&Document, &mut GameState)) {
    let Ok(document) = document() else {
        return;
    };
    GAME.with(|game| {
        if let Some(state) = game.borrow_mut().as_mut() {
            f(&document, state);
        }
    });
}

// -----------------------------------------------------------------------------
// Event wiring
// -----------------------------------------------------------------------------

fn bind_events(document: &Document) -> Result<(), JsValue> {
    let start_button = document
        .get_element_by_id(ui::START_ID)
        .ok_or_else(|| JsValue::from_str("missing start button"))?;
    let on_click = Closure::wrap(Box::new(|| {
        with_state(|document, state| {
            if state.running {
                stop_run(document, state);
            } else {
                start_run(document, state);
            }
        });
    }) as Box<dyn FnMut()>);
    start_button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();

    let answer = document
        .get_element_by_id(ui::ANSWER_ID)
        .ok_or_else(|| JsValue::from_str("missing answer input"))?;
    let on_keydown = Closure::wrap(Box::new(|evt: KeyboardEvent| {
        if evt.key() == "Enter" {
            evt.prevent_default();
            with_state(|document, state| {
                if state.running {
                    handle_answer(document, state);
                }
            });
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    answer.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())?;
    on_keydown.forget();

    let select = document
        .get_element_by_id(ui::DIFFICULTY_ID)
        .ok_or_else(|| JsValue::from_str("missing difficulty select"))?;
    let on_difficulty = Closure::wrap(Box::new(|evt: Event| {
        let value = evt
            .target()
            .and_then(|target| target.dyn_into::<HtmlSelectElement>().ok())
            .map(|select| select.value());
        let Some(difficulty) = value.as_deref().and_then(Difficulty::from_key) else {
            return;
        };
        with_state(|document, state| change_difficulty(document, state, difficulty));
    }) as Box<dyn FnMut(Event)>);
    select.add_event_listener_with_callback("change", on_difficulty.as_ref().unchecked_ref())?;
    on_difficulty.forget();

    let sound = document
        .get_element_by_id(ui::SOUND_TOGGLE_ID)
        .ok_or_else(|| JsValue::from_str("missing sound toggle"))?;
    let on_sound = Closure::wrap(Box::new(|evt: Event| {
        let Some(checked) = checkbox_state(&evt) else {
            return;
        };
        with_state(|_document, state| state.sound_enabled = checked);
    }) as Box<dyn FnMut(Event)>);
    sound.add_event_listener_with_callback("change", on_sound.as_ref().unchecked_ref())?;
    on_sound.forget();

    let bgm = document
        .get_element_by_id(ui::BGM_TOGGLE_ID)
        .ok_or_else(|| JsValue::from_str("missing bgm toggle"))?;
    let on_bgm = Closure::wrap(Box::new(|evt: Event| {
        let Some(checked) = checkbox_state(&evt) else {
            return;
        };
        with_state(|_document, state| {
            state.bgm_enabled = checked;
            if !checked {
                audio::stop_bgm();
            } else if state.running {
                audio::start_bgm();
            }
        });
    }) as Box<dyn FnMut(Event)>);
    bgm.add_event_listener_with_callback("change", on_bgm.as_ref().unchecked_ref())?;
    on_bgm.forget();

    Ok(())
}

fn checkbox_state(evt: &Event) -> Option<bool> {
    evt.target()?
        .dyn_into::<web_sys::HtmlInputElement>()
        .ok()
        .map(|input| input.checked())
}

// -----------------------------------------------------------------------------
// Run control
// -----------------------------------------------------------------------------

fn start_run(document: &Document, state: &mut GameState) {
    state.running = true;
    state.time_remaining = RUN_SECONDS;
    state.session.reset();
    state.end_timestamp = now_ms() + RUN_SECONDS * 1000.0;
    ui::reset_feedback(document);
    ui::update_stats(document, state.time_remaining, &state.session);
    if let Some(answer) = ui::answer_input(document) {
        answer.set_value("");
        answer.set_disabled(false);
        let _ = answer.focus();
    }
    next_prompt(document, state);
    ui::update_start_button(document, true);
    if let Err(err) = start_timer(state) {
        console::warn_1(&err);
    }
    if state.bgm_enabled {
        audio::start_bgm();
    }
}

fn stop_run(document: &Document, state: &mut GameState) {
    if !state.running {
        return;
    }
    if let Some(id) = state.timer_id.take() {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(id);
        }
    }
    state.running = false;
    state.time_remaining = state.time_remaining.max(0.0);
    if let Some(answer) = ui::answer_input(document) {
        answer.set_disabled(true);
    }
    ui::update_start_button(document, false);
    ui::update_stats(document, state.time_remaining, &state.session);
    audio::stop_bgm();
    summarize(document, state);
}

fn start_timer(state: &mut GameState) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    if let Some(id) = state.timer_id.take() {
        window.clear_interval_with_handle(id);
    }
    let on_tick = Closure::wrap(Box::new(|| {
        with_state(|document, state| tick(document, state));
    }) as Box<dyn FnMut()>);
    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
        on_tick.as_ref().unchecked_ref(),
        TICK_MS,
    )?;
    state.timer_id = Some(id);
    state._tick_closure = Some(on_tick);
    Ok(())
}

fn tick(document: &Document, state: &mut GameState) {
    let remaining_ms = state.end_timestamp - now_ms();
    state.time_remaining = (remaining_ms / 1000.0).max(0.0);
    ui::update_stats(document, state.time_remaining, &state.session);
    if state.time_remaining <= 0.0 {
        stop_run(document, state);
    }
}

// -----------------------------------------------------------------------------
// Gameplay
// -----------------------------------------------------------------------------

fn next_prompt(document: &Document, state: &mut GameState) {
    let mut rng = |n: usize| (js_sys::Math::random() * n as f64) as usize;
    let prompt = prompt::generate(state.difficulty, &mut rng);
    state.expected = romaji::normalize(&prompt.romaji);
    ui::set_prompt(document, &prompt.kana);
}

fn handle_answer(document: &Document, state: &mut GameState) {
    let Some(answer) = ui::answer_input(document) else {
        return;
    };
    let raw = answer.value();
    let Some(correct) = state.session.check_answer(&raw, &state.expected) else {
        // Nothing typable in the box; keep prompt and input as they are.
        return;
    };

    if correct {
        ui::set_feedback(document, "正解！", true);
        if state.sound_enabled {
            audio::play_effect(EffectKind::Success);
        }
    } else {
        ui::set_feedback(document, "ざんねん！", false);
        if state.sound_enabled {
            audio::play_effect(EffectKind::Error);
        }
    }

    answer.set_value("");
    next_prompt(document, state);
    ui::update_stats(document, state.time_remaining, &state.session);
}

fn change_difficulty(document: &Document, state: &mut GameState, difficulty: Difficulty) {
    state.difficulty = difficulty;
    ui::update_personal_best(document, state.high_scores.get(difficulty));
    ui::update_ranking_description(document, difficulty);
    if let Err(err) = ui::render_ranking_table(document, state.rankings.bucket(difficulty)) {
        console::warn_1(&err);
    }
    if !state.running {
        ui::set_prompt(document, ui::PROMPT_IDLE_TEXT);
    }
}

// -----------------------------------------------------------------------------
// End of run
// -----------------------------------------------------------------------------

fn summarize(document: &Document, state: &mut GameState) {
    ui::show_summary(document, &state.session);

    let outcome = state
        .high_scores
        .record(state.difficulty, state.session.score);
    if outcome == BestOutcome::Improved {
        storage::save_high_scores(&state.high_scores);
        ui::update_personal_best(document, state.high_scores.get(state.difficulty));
    }
    ui::update_high_score_message(document, outcome);

    // Idle runs never enter the ranking, but the table is re-rendered and
    // saved either way.
    if state.session.attempts > 0 {
        let entry = RankingEntry {
            score: state.session.score,
            created_at: String::from(js_sys::Date::new_0().to_iso_string()),
        };
        ranking::submit(state.rankings.bucket_mut(state.difficulty), entry);
    }
    if let Err(err) = ui::render_ranking_table(document, state.rankings.bucket(state.difficulty)) {
        console::warn_1(&err);
    }
    storage::save_rankings(&state.rankings);
}
