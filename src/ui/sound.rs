/// Sound engine: procedural chiptune effects via rodio.
///
/// Every effect is synthesised once at init into an f32 sample buffer.
/// Playback is fire-and-forget through a detached Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

/// One sound per audible event kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Chomp,
    PowerUp,
    GhostEaten,
    LifeLost,
    GameOver,
    Win,
}

impl Sfx {
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    pub const ALL: [Sfx; 6] = [Sfx::Chomp, Sfx::PowerUp, Sfx::GhostEaten, Sfx::LifeLost, Sfx::GameOver, Sfx::Win];

    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::PelletEaten { .. } => Some(Sfx::Chomp),
            GameEvent::PowerPelletEaten { .. } => Some(Sfx::PowerUp),
            GameEvent::GhostEaten { .. } => Some(Sfx::GhostEaten),
            // The last life gets the game-over jingle instead.
            GameEvent::LifeLost { lives_left } if *lives_left > 0 => Some(Sfx::LifeLost),
            GameEvent::GameOver => Some(Sfx::GameOver),
            GameEvent::Won => Some(Sfx::Win),
            _ => None,
        }
    }
}

/// Effects for a tick's events, at most one of each kind.
pub fn effects_for(events: &[GameEvent]) -> Vec<Sfx> {
    let mut out: Vec<Sfx> = Vec::new();
    for sfx in events.iter().filter_map(Sfx::for_event) {
        if !out.contains(&sfx) {
            out.push(sfx);
        }
    }
    out
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::sync::Arc;

    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Indexed by `Sfx as usize`.
        buffers: Vec<Arc<Vec<f32>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("no audio output: {e}");
                    return None;
                }
            };
            let buffers = Sfx::ALL.iter().map(|&s| Arc::new(synth(s))).collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let samples = match self.buffers.get(sfx as usize) {
                Some(buf) => buf.as_ref().clone(),
                None => return,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples));
                sink.detach();
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn synth(sfx: Sfx) -> Vec<f32> {
        match sfx {
            Sfx::Chomp => sweep(480.0, 240.0, 0.06, 0.20),
            Sfx::PowerUp => notes(&[(392.0, 0.06), (523.0, 0.06), (659.0, 0.06), (784.0, 0.10)], 0.25),
            Sfx::GhostEaten => sweep(200.0, 1200.0, 0.18, 0.25),
            Sfx::LifeLost => sweep(700.0, 150.0, 0.45, 0.30),
            Sfx::GameOver => notes(&[(392.0, 0.18), (330.0, 0.18), (262.0, 0.18), (196.0, 0.40)], 0.30),
            Sfx::Win => notes(&[(523.0, 0.10), (659.0, 0.10), (784.0, 0.10), (1047.0, 0.35)], 0.30),
        }
    }

    /// Square-ish voice (sine + 3rd harmonic).
    fn voice(phase: f32) -> f32 {
        phase.sin() * 0.75 + (phase * 3.0).sin() * 0.25
    }

    /// Linear pitch glide with a fade-out envelope.
    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += TAU * freq / SAMPLE_RATE as f32;
                voice(phase) * (1.0 - t) * volume
            })
            .collect()
    }

    /// Note sequence of (frequency, seconds).
    fn notes(seq: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in seq {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(2.0);
                samples.push(voice(t * freq * TAU) * env * volume);
            }
        }
        samples
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}
