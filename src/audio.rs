//! Oscillator sound: answer feedback blips and a looping background pad.
//!
//! Everything is synthesized on the fly through Web Audio, so the page ships
//! no audio assets. The context is created lazily on first use because
//! browsers refuse to start one before a user gesture, and resumed whenever
//! autoplay policy left it suspended.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

// Low sine chord under everything, one triangle note on top every 1.5s.
const PAD_FREQS: [f32; 3] = [196.0, 247.0, 294.0];
const MELODY: [f32; 8] = [392.0, 440.0, 523.25, 494.0, 440.0, 392.0, 349.23, 329.63];
const NOTE_INTERVAL_MS: i32 = 1500;

/// Which feedback blip to play after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Success,
    Error,
}

struct SoundManager {
    context: Option<AudioContext>,
    bgm_gain: Option<GainNode>,
    bgm_pads: Vec<(OscillatorNode, GainNode)>,
    melody_timeout: Option<i32>,
    melody_closure: Option<Closure<dyn FnMut()>>,
    bgm_step: usize,
}

thread_local! {
    static SOUND: RefCell<SoundManager> = RefCell::new(SoundManager::new());
}

/// Play a short feedback blip. Failures are logged, never propagated; a run
/// must not die because audio did.
pub fn play_effect(kind: EffectKind) {
    let played = SOUND.with(|sound| sound.borrow_mut().play_effect(kind));
    if let Err(err) = played {
        console::warn_1(&err);
    }
}

/// Fade the background pads in and start the melody loop. Idempotent while
/// the pads are already sounding.
pub fn start_bgm() {
    let started = SOUND.with(|sound| sound.borrow_mut().start_pads());
    match started {
        Ok(true) => melody_tick(),
        Ok(false) => {}
        Err(err) => console::warn_1(&err),
    }
}

/// Fade the background out and tear the node graph down shortly after.
pub fn stop_bgm() {
    SOUND.with(|sound| sound.borrow_mut().stop_bgm());
}

// One melody note, then reschedule. Runs from setTimeout, so it takes a fresh
// borrow every time.
fn melody_tick() {
    let played = SOUND.with(|sound| sound.borrow_mut().play_melody_note());
    if let Err(err) = played {
        console::warn_1(&err);
    }
}

impl SoundManager {
    fn new() -> SoundManager {
        SoundManager {
            context: None,
            bgm_gain: None,
            bgm_pads: Vec::new(),
            melody_timeout: None,
            melody_closure: None,
            bgm_step: 0,
        }
    }

    fn ensure_context(&mut self) -> Result<AudioContext, JsValue> {
        match &self.context {
            Some(ctx) => Ok(ctx.clone()),
            None => {
                let ctx = AudioContext::new()?;
                self.context = Some(ctx.clone());
                Ok(ctx)
            }
        }
    }

    fn play_effect(&mut self, kind: EffectKind) -> Result<(), JsValue> {
        let ctx = self.ensure_context()?;
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let osc = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;
        let now = ctx.current_time();
        let (start_freq, end_freq) = match kind {
            EffectKind::Success => (780.0, 520.0),
            EffectKind::Error => (200.0, 120.0),
        };

        osc.set_type(OscillatorType::Triangle);
        osc.frequency().set_value_at_time(start_freq, now)?;
        osc.frequency()
            .linear_ramp_to_value_at_time(end_freq, now + 0.18)?;
        gain.gain().set_value_at_time(0.001, now)?;
        gain.gain().exponential_ramp_to_value_at_time(0.22, now + 0.02)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, now + 0.25)?;

        osc.connect_with_audio_node(&gain)?
            .connect_with_audio_node(&ctx.destination())?;
        osc.start_with_when(now)?;
        osc.stop_with_when(now + 0.3)?;
        Ok(())
    }

    // Build master gain + pad oscillators and arm the melody closure. Returns
    // false when the pads are already up. The first melody note is played by
    // the caller, outside this borrow.
    fn start_pads(&mut self) -> Result<bool, JsValue> {
        let ctx = self.ensure_context()?;
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        if self.bgm_gain.is_some() {
            return Ok(false);
        }

        let master = ctx.create_gain()?;
        master.gain().set_value_at_time(0.0, ctx.current_time())?;
        master.connect_with_audio_node(&ctx.destination())?;
        self.bgm_gain = Some(master.clone());

        for (index, &freq) in PAD_FREQS.iter().enumerate() {
            let osc = ctx.create_oscillator()?;
            let gain = ctx.create_gain()?;
            osc.set_type(OscillatorType::Sine);
            osc.frequency().set_value(freq);
            gain.gain().set_value(0.0);
            osc.connect_with_audio_node(&gain)?
                .connect_with_audio_node(&master)?;
            osc.start()?;

            let now = ctx.current_time();
            gain.gain().set_value_at_time(0.0, now)?;
            gain.gain()
                .linear_ramp_to_value_at_time(0.05 + index as f32 * 0.01, now + 2.0)?;
            self.bgm_pads.push((osc, gain));
        }

        master
            .gain()
            .linear_ramp_to_value_at_time(0.2, ctx.current_time() + 2.4)?;

        self.bgm_step = 0;
        self.melody_closure = Some(Closure::wrap(Box::new(melody_tick) as Box<dyn FnMut()>));
        Ok(true)
    }

    fn play_melody_note(&mut self) -> Result<(), JsValue> {
        // Stopped in the meantime: let the loop die quietly.
        let (ctx, master) = match (&self.context, &self.bgm_gain) {
            (Some(ctx), Some(master)) => (ctx.clone(), master.clone()),
            _ => return Ok(()),
        };

        let freq = MELODY[self.bgm_step % MELODY.len()];
        self.bgm_step += 1;

        let osc = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;
        osc.set_type(OscillatorType::Triangle);
        osc.frequency().set_value(freq);
        gain.gain().set_value(0.0);
        osc.connect_with_audio_node(&gain)?
            .connect_with_audio_node(&master)?;

        let now = ctx.current_time();
        gain.gain().set_value_at_time(0.0, now)?;
        gain.gain().linear_ramp_to_value_at_time(0.1, now + 0.15)?;
        gain.gain().linear_ramp_to_value_at_time(0.0, now + 1.3)?;
        osc.start_with_when(now)?;
        osc.stop_with_when(now + 1.4)?;

        if let Some(callback) = &self.melody_closure {
            let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
            let id = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                NOTE_INTERVAL_MS,
            )?;
            self.melody_timeout = Some(id);
        }
        Ok(())
    }

    fn stop_bgm(&mut self) {
        let (ctx, master) = match (&self.context, &self.bgm_gain) {
            (Some(ctx), Some(master)) => (ctx.clone(), master.clone()),
            _ => return,
        };
        let now = ctx.current_time();

        if let Some(id) = self.melody_timeout.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(id);
            }
        }
        self.melody_closure = None;

        let pads = std::mem::take(&mut self.bgm_pads);
        for (osc, pad_gain) in &pads {
            let silenced = fade_gain(pad_gain, now).and_then(|_| osc.stop_with_when(now + 0.7));
            if let Err(err) = silenced {
                console::warn_1(&err);
            }
        }
        if let Err(err) = fade_gain(&master, now) {
            console::warn_1(&err);
        }

        // Tear the graph down once the fade has finished.
        let cleanup = Closure::once_into_js(move || {
            for (osc, pad_gain) in &pads {
                let _ = pad_gain.disconnect();
                let _ = osc.disconnect();
            }
            let _ = master.disconnect();
        });
        if let Some(window) = web_sys::window() {
            let scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                cleanup.unchecked_ref(),
                750,
            );
            if let Err(err) = scheduled {
                console::warn_1(&err);
            }
        }

        self.bgm_gain = None;
        self.bgm_step = 0;
    }
}

fn fade_gain(gain: &GainNode, now: f64) -> Result<(), JsValue> {
    gain.gain().cancel_scheduled_values(now)?;
    gain.gain().linear_ramp_to_value_at_time(0.0001, now + 0.6)?;
    Ok(())
}
