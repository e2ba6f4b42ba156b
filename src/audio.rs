//! Sound cues
//!
//! Procedurally generated sound effects - no external files needed! Every cue
//! is a short list of oscillator notes; the Web Audio backend schedules them
//! and returns immediately. Playing a cue never blocks and never fails loudly.

/// Named one-shot cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Jump started
    Jump,
    /// Touched down after being airborne
    Landing,
    /// Player died
    Death,
    /// Goal reached or achievement unlocked
    Achievement,
    /// UI button
    Click,
}

/// One oscillator voice of a cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Offset from the cue start (seconds)
    pub at: f32,
    pub freq_start: f32,
    /// Exponential sweep target
    pub freq_end: f32,
    /// Peak gain before master/sfx scaling
    pub gain: f32,
    /// Seconds
    pub duration: f32,
    /// Short linear fade-in instead of an instant attack
    pub soft_attack: bool,
}

impl Note {
    const fn sweep(freq_start: f32, freq_end: f32, gain: f32, duration: f32) -> Self {
        Self {
            at: 0.0,
            freq_start,
            freq_end,
            gain,
            duration,
            soft_attack: false,
        }
    }

    const fn chime(at: f32, freq: f32) -> Self {
        Self {
            at,
            freq_start: freq,
            freq_end: freq,
            gain: 0.1,
            duration: 0.3,
            soft_attack: true,
        }
    }
}

const JUMP: [Note; 1] = [Note::sweep(400.0, 600.0, 0.1, 0.1)];
const LANDING: [Note; 1] = [Note::sweep(150.0, 100.0, 0.1, 0.05)];
const DEATH: [Note; 1] = [Note::sweep(300.0, 50.0, 0.2, 0.5)];
// C, E, G, C
const ACHIEVEMENT: [Note; 4] = [
    Note::chime(0.0, 523.0),
    Note::chime(0.1, 659.0),
    Note::chime(0.2, 784.0),
    Note::chime(0.3, 1047.0),
];
const CLICK: [Note; 1] = [Note::sweep(800.0, 800.0, 0.05, 0.1)];

impl AudioCue {
    pub fn notes(&self) -> &'static [Note] {
        match self {
            AudioCue::Jump => &JUMP,
            AudioCue::Landing => &LANDING,
            AudioCue::Death => &DEATH,
            AudioCue::Achievement => &ACHIEVEMENT,
            AudioCue::Click => &CLICK,
        }
    }

    /// Seconds until the last voice stops
    pub fn duration(&self) -> f32 {
        self.notes()
            .iter()
            .map(|n| n.at + n.duration)
            .fold(0.0, f32::max)
    }
}

/// Anything that can play cues
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;

    /// Master and effects volume, both 0.0 - 1.0
    fn set_volume(&mut self, _master: f32, _sfx: f32) {}

    /// Flip mute; returns the new state
    fn toggle_mute(&mut self) -> bool {
        let muted = !self.is_muted();
        self.set_muted(muted);
        muted
    }
}

/// Silent sink for hosts without audio
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio {
    muted: bool,
}

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) {}

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

/// Best available sink for this platform
pub fn default_sink() -> Box<dyn AudioSink> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(web::WebAudio::new())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(NullAudio::default())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioCue, AudioSink, Note};

    /// Web Audio oscillator backend
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
            }
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn schedule(ctx: &AudioContext, note: &Note, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, note.freq_start, OscillatorType::Sine)
            else {
                return;
            };
            let t = ctx.current_time() + note.at as f64;
            let end = t + note.duration as f64;
            let peak = note.gain * vol;

            if note.soft_attack {
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().linear_ramp_to_value_at_time(peak, t + 0.01).ok();
            } else {
                gain.gain().set_value_at_time(peak, t).ok();
            }
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();

            osc.frequency().set_value_at_time(note.freq_start, t).ok();
            if note.freq_end != note.freq_start {
                osc.frequency()
                    .exponential_ramp_to_value_at_time(note.freq_end, end)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(end).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: AudioCue) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for note in cue.notes() {
                Self::schedule(ctx, note, vol);
            }
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn is_muted(&self) -> bool {
            self.muted
        }

        fn set_volume(&mut self, master: f32, sfx: f32) {
            self.master_volume = master.clamp(0.0, 1.0);
            self.sfx_volume = sfx.clamp(0.0, 1.0);
        }
    }
}
