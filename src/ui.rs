//! DOM widgets and rendering.
//!
//! The crate owns its markup: [`ensure_ui`] builds the whole control panel
//! under `document.body` on first call and leaves an existing one alone, so a
//! host page needs nothing beyond an empty `<body>`. Every element carries a
//! `ks-` prefixed id and rendering goes through id lookups, never through
//! cached node handles.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement};

use crate::ranking::RankingEntry;
use crate::session::Session;
use crate::storage::BestOutcome;
use crate::Difficulty;

pub(crate) const ROOT_ID: &str = "ks-root";
pub(crate) const DIFFICULTY_ID: &str = "ks-difficulty";
pub(crate) const SOUND_TOGGLE_ID: &str = "ks-sound-toggle";
pub(crate) const BGM_TOGGLE_ID: &str = "ks-bgm-toggle";
pub(crate) const TIME_ID: &str = "ks-time";
pub(crate) const SCORE_ID: &str = "ks-score";
pub(crate) const SUCCESS_ID: &str = "ks-success-count";
pub(crate) const ACCURACY_ID: &str = "ks-accuracy";
pub(crate) const BEST_ID: &str = "ks-personal-best";
pub(crate) const PROMPT_ID: &str = "ks-prompt";
pub(crate) const ANSWER_ID: &str = "ks-answer";
pub(crate) const START_ID: &str = "ks-start";
pub(crate) const FEEDBACK_ID: &str = "ks-feedback";
pub(crate) const FINAL_SCORE_ID: &str = "ks-final-score";
pub(crate) const FINAL_SUCCESS_ID: &str = "ks-final-success";
pub(crate) const FINAL_ATTEMPTS_ID: &str = "ks-final-attempts";
pub(crate) const FINAL_ACCURACY_ID: &str = "ks-final-accuracy";
pub(crate) const HIGH_SCORE_MSG_ID: &str = "ks-highscore-message";
pub(crate) const RANKING_DESC_ID: &str = "ks-ranking-description";
pub(crate) const RANKING_BODY_ID: &str = "ks-ranking-body";

pub(crate) const PROMPT_IDLE_TEXT: &str = "スタートボタンを押してね";

// -----------------------------------------------------------------------------
// Construction
// -----------------------------------------------------------------------------

/// Build the game panel unless one is already in the document.
pub fn ensure_ui(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id(ROOT_ID).is_some() {
        return Ok(());
    }
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let root = document.create_element("section")?;
    root.set_id(ROOT_ID);
    root.set_class_name("kana-sprint");

    let settings = document.create_element("div")?;
    settings.set_class_name("settings");
    let difficulty_row = difficulty_field(document)?;
    settings.append_child(&difficulty_row)?;
    for (id, text) in [(SOUND_TOGGLE_ID, "効果音"), (BGM_TOGGLE_ID, "BGM")] {
        let toggle = toggle_field(document, id, text)?;
        settings.append_child(&toggle)?;
    }
    root.append_child(&settings)?;

    let stats = document.create_element("div")?;
    stats.set_class_name("stats");
    for (label, id, initial) in [
        ("のこり時間", TIME_ID, "60.0"),
        ("スコア", SCORE_ID, "0"),
        ("成功", SUCCESS_ID, "0"),
        ("正確さ", ACCURACY_ID, "0%"),
        ("自己ベスト", BEST_ID, "--"),
    ] {
        let field = stat_field(document, label, id, initial)?;
        stats.append_child(&field)?;
    }
    root.append_child(&stats)?;

    let prompt = document.create_element("p")?;
    prompt.set_id(PROMPT_ID);
    prompt.set_class_name("prompt");
    prompt.set_text_content(Some(PROMPT_IDLE_TEXT));
    root.append_child(&prompt)?;

    let answer: HtmlInputElement = document.create_element("input")?.dyn_into()?;
    answer.set_id(ANSWER_ID);
    answer.set_type("text");
    answer.set_autocomplete("off");
    answer.set_placeholder("ローマ字で入力");
    answer.set_disabled(true);
    root.append_child(&answer)?;

    let start = document.create_element("button")?;
    start.set_id(START_ID);
    start.set_text_content(Some("ゲームスタート"));
    root.append_child(&start)?;

    let feedback = document.create_element("p")?;
    feedback.set_id(FEEDBACK_ID);
    feedback.set_class_name("feedback");
    root.append_child(&feedback)?;

    let result = document.create_element("div")?;
    result.set_class_name("result");
    for (label, id, initial) in [
        ("最終スコア", FINAL_SCORE_ID, "0"),
        ("成功数", FINAL_SUCCESS_ID, "0"),
        ("挑戦数", FINAL_ATTEMPTS_ID, "0"),
        ("正確さ", FINAL_ACCURACY_ID, "0%"),
    ] {
        let field = stat_field(document, label, id, initial)?;
        result.append_child(&field)?;
    }
    let message = document.create_element("p")?;
    message.set_id(HIGH_SCORE_MSG_ID);
    message.set_class_name("highscore-message");
    result.append_child(&message)?;
    root.append_child(&result)?;

    let ranking = ranking_block(document)?;
    root.append_child(&ranking)?;

    body.append_child(&root)?;
    Ok(())
}

fn difficulty_field(document: &Document) -> Result<Element, JsValue> {
    let label = document.create_element("label")?;
    label.set_text_content(Some("難易度"));
    let select: HtmlSelectElement = document.create_element("select")?.dyn_into()?;
    select.set_id(DIFFICULTY_ID);
    for difficulty in Difficulty::ALL {
        let option = document.create_element("option")?;
        option.set_attribute("value", difficulty.key())?;
        option.set_text_content(Some(difficulty.label()));
        select.append_child(&option)?;
    }
    label.append_child(&select)?;
    Ok(label)
}

fn toggle_field(document: &Document, id: &str, text: &str) -> Result<Element, JsValue> {
    let label = document.create_element("label")?;
    label.set_text_content(Some(text));
    let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
    input.set_id(id);
    input.set_type("checkbox");
    input.set_checked(true);
    label.append_child(&input)?;
    Ok(label)
}

fn stat_field(document: &Document, label: &str, id: &str, initial: &str) -> Result<Element, JsValue> {
    let wrap = document.create_element("div")?;
    wrap.set_class_name("stat");
    let caption = document.create_element("span")?;
    caption.set_class_name("stat-label");
    caption.set_text_content(Some(label));
    let value = document.create_element("span")?;
    value.set_id(id);
    value.set_class_name("stat-value");
    value.set_text_content(Some(initial));
    wrap.append_child(&caption)?;
    wrap.append_child(&value)?;
    Ok(wrap)
}

fn ranking_block(document: &Document) -> Result<Element, JsValue> {
    let ranking = document.create_element("div")?;
    ranking.set_class_name("ranking");

    let heading = document.create_element("h2")?;
    heading.set_text_content(Some("ローカルランキング"));
    ranking.append_child(&heading)?;

    let description = document.create_element("p")?;
    description.set_id(RANKING_DESC_ID);
    ranking.append_child(&description)?;

    let table = document.create_element("table")?;
    let thead = document.create_element("thead")?;
    let head_row = document.create_element("tr")?;
    for title in ["順位", "スコア", "日時"] {
        let th = document.create_element("th")?;
        th.set_text_content(Some(title));
        head_row.append_child(&th)?;
    }
    thead.append_child(&head_row)?;
    table.append_child(&thead)?;

    let tbody = document.create_element("tbody")?;
    tbody.set_id(RANKING_BODY_ID);
    table.append_child(&tbody)?;
    ranking.append_child(&table)?;
    Ok(ranking)
}

// -----------------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------------

pub fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn update_stats(document: &Document, time_remaining: f64, session: &Session) {
    set_text(document, TIME_ID, &format!("{time_remaining:.1}"));
    set_text(document, SCORE_ID, &session.score.to_string());
    set_text(document, SUCCESS_ID, &session.successes.to_string());
    set_text(document, ACCURACY_ID, &format!("{}%", session.accuracy_percent()));
}

pub fn update_personal_best(document: &Document, best: Option<u32>) {
    let text = match best {
        Some(score) => score.to_string(),
        None => "--".to_string(),
    };
    set_text(document, BEST_ID, &text);
}

pub fn update_start_button(document: &Document, running: bool) {
    let text = if running { "リセット" } else { "ゲームスタート" };
    set_text(document, START_ID, text);
}

pub fn set_prompt(document: &Document, text: &str) {
    set_text(document, PROMPT_ID, text);
}

pub fn set_feedback(document: &Document, message: &str, success: bool) {
    if let Some(el) = document.get_element_by_id(FEEDBACK_ID) {
        el.set_text_content(Some(message));
        el.set_class_name(if success {
            "feedback success"
        } else {
            "feedback error"
        });
    }
}

pub fn reset_feedback(document: &Document) {
    if let Some(el) = document.get_element_by_id(FEEDBACK_ID) {
        el.set_text_content(Some(""));
        el.set_class_name("feedback");
    }
}

pub fn show_summary(document: &Document, session: &Session) {
    set_text(document, FINAL_SCORE_ID, &session.score.to_string());
    set_text(document, FINAL_SUCCESS_ID, &session.successes.to_string());
    set_text(document, FINAL_ATTEMPTS_ID, &session.attempts.to_string());
    set_text(document, FINAL_ACCURACY_ID, &format!("{}%", session.accuracy_percent()));
}

pub fn update_high_score_message(document: &Document, outcome: BestOutcome) {
    set_text(document, HIGH_SCORE_MSG_ID, best_message(outcome));
}

pub fn update_ranking_description(document: &Document, difficulty: Difficulty) {
    let text = format!("難易度: {} の最新 10 件", difficulty.label());
    set_text(document, RANKING_DESC_ID, &text);
}

/// Rebuild the ranking table body. An empty bucket gets a single placeholder
/// row instead of a bare table.
pub fn render_ranking_table(document: &Document, entries: &[RankingEntry]) -> Result<(), JsValue> {
    let Some(body) = document.get_element_by_id(RANKING_BODY_ID) else {
        return Ok(());
    };
    if entries.is_empty() {
        body.set_inner_html("<tr><td colspan=\"3\">まだスコアが登録されていません。</td></tr>");
        return Ok(());
    }

    body.set_inner_html("");
    for (index, entry) in entries.iter().enumerate() {
        let row = document.create_element("tr")?;
        let rank = document.create_element("td")?;
        rank.set_class_name("rank");
        rank.set_text_content(Some(&(index + 1).to_string()));
        let score = document.create_element("td")?;
        score.set_class_name("rank-score");
        score.set_text_content(Some(&entry.score.to_string()));
        let date = document.create_element("td")?;
        date.set_class_name("rank-date");
        date.set_text_content(Some(&format_timestamp(&entry.created_at)));
        row.append_child(&rank)?;
        row.append_child(&score)?;
        row.append_child(&date)?;
        body.append_child(&row)?;
    }
    Ok(())
}

pub fn answer_input(document: &Document) -> Option<HtmlInputElement> {
    document.get_element_by_id(ANSWER_ID)?.dyn_into().ok()
}

fn best_message(outcome: BestOutcome) -> &'static str {
    match outcome {
        BestOutcome::Improved => "自己ベストを更新しました！",
        BestOutcome::Tied => "自己ベストに並びました！",
        BestOutcome::Unchanged => "",
    }
}

// Renders the stored ISO timestamp in the viewer's locale; entries that were
// saved without one show "-".
fn format_timestamp(created_at: &str) -> String {
    if created_at.is_empty() {
        return "-".to_string();
    }
    let date = js_sys::Date::new(&JsValue::from_str(created_at));
    String::from(date.to_locale_string("ja-JP", &JsValue::UNDEFINED))
}
