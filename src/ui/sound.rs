/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature, or set `[audio] enabled = false`,
/// to disable audio entirely (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

/// One sound effect.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Sfx {
    Gem,
    Hit,
    KeyRevealed,
    LevelClear,
    /// Pitch rises with the share of rows scrolled so far.
    RowBlip { ratio: f32 },
    GameOver,
}

/// Effect for a game event, if it has one.
pub fn effect_for(event: &GameEvent, num_rows: usize) -> Option<Sfx> {
    match event {
        GameEvent::GemCollected { .. } => Some(Sfx::Gem),
        GameEvent::PlayerHit { .. } => Some(Sfx::Hit),
        GameEvent::KeyRevealed => Some(Sfx::KeyRevealed),
        GameEvent::KeyCollected { .. } => Some(Sfx::LevelClear),
        GameEvent::RowScrolled { row } => Some(Sfx::RowBlip {
            ratio: *row as f32 / num_rows.max(1) as f32,
        }),
        GameEvent::GameOver { .. } => Some(Sfx::GameOver),
        GameEvent::PlayerRespawned { .. }
        | GameEvent::LevelStarted { .. }
        | GameEvent::Restarted => None,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    /// Encoded WAV bytes. Each play shares the buffer instead of copying it.
    pub(super) type Wav = Arc<[u8]>;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_gem: Wav,
        sfx_hit: Wav,
        sfx_key: Wav,
        sfx_clear: Wav,
        sfx_game_over: Wav,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_gem: Wav::from(make_wav(&gen_gem())),
                sfx_hit: Wav::from(make_wav(&gen_hit())),
                sfx_key: Wav::from(make_wav(&gen_key())),
                sfx_clear: Wav::from(make_wav(&gen_clear())),
                sfx_game_over: Wav::from(make_wav(&gen_game_over())),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            match sfx {
                Sfx::Gem => self.play_buf(&self.sfx_gem),
                Sfx::Hit => self.play_buf(&self.sfx_hit),
                Sfx::KeyRevealed => self.play_buf(&self.sfx_key),
                Sfx::LevelClear => self.play_buf(&self.sfx_clear),
                Sfx::GameOver => self.play_buf(&self.sfx_game_over),
                Sfx::RowBlip { ratio } => {
                    let freq = 300.0 + ratio.clamp(0.0, 1.0) * 800.0;
                    self.play_buf(&Wav::from(make_wav(&gen_blip(freq, 0.035, 0.25))));
                }
            }
        }

        fn play_buf(&self, buf: &Wav) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Some(src) = decode(buf) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    pub(super) fn decode(buf: &Wav) -> Option<Decoder<Cursor<Wav>>> {
        Decoder::new(Cursor::new(Arc::clone(buf))).ok()
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn tone(freq: f32, t: f32) -> f32 {
        (t * freq * 2.0 * std::f32::consts::PI).sin()
    }

    /// Simple sine blip at given frequency and duration
    pub(super) fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                tone(freq, t) * env * volume
            })
            .collect()
    }

    /// Gem pickup: quick ascending arpeggio C6→E6→G6
    fn gen_gem() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[1047.0_f32, 1319.0, 1568.0] {
            let n = (SAMPLE_RATE as f32 * 0.045) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                // sine + 3rd harmonic for a square-ish edge
                let wave = tone(freq, t) * 0.7 + tone(freq * 3.0, t) * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Bug hit: noise burst over a falling tone
    fn gen_hit() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.25) as usize;
        let mut lcg: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 500.0 - t * 350.0;
                lcg = lcg.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (lcg as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.7);
                (tone(freq, i as f32 / SAMPLE_RATE as f32) * 0.6 + noise * 0.4) * env * 0.3
            })
            .collect()
    }

    /// Key appears: two-note chime G5, C6
    fn gen_key() -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in &[(784.0_f32, 0.08), (1047.0, 0.15)] {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = tone(freq, t) * 0.7 + tone(freq * 2.0, t) * 0.3;
                samples.push(wave * env * 0.3);
            }
        }
        samples
    }

    /// Key taken: ascending fanfare C5→E5→G5→C6 with a held last note
    fn gen_clear() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[523.0_f32, 659.0, 784.0, 1047.0] {
            let n = (SAMPLE_RATE as f32 * 0.1) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = tone(freq, t) * 0.6 + tone(freq * 2.0, t) * 0.3 + tone(freq * 3.0, t) * 0.1;
                samples.push(wave * env * 0.3);
            }
        }
        let n = (SAMPLE_RATE as f32 * 0.25) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            samples.push(tone(1047.0, t) * env * 0.3);
        }
        samples
    }

    /// Game over: slow descending minor line A4→F4→D4→A3, faded out
    fn gen_game_over() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[440.0_f32, 349.0, 294.0, 220.0] {
            let n = (SAMPLE_RATE as f32 * 0.18) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push(tone(freq, t) * env * 0.3);
            }
        }
        let total = samples.len();
        let fade_len = total / 4;
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= (fade_len - k) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    pub(super) fn all_effects() -> Vec<Vec<f32>> {
        vec![gen_gem(), gen_hit(), gen_key(), gen_clear(), gen_game_over()]
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_map_to_effects() {
        assert_eq!(effect_for(&GameEvent::GemCollected { col: 1, row: 1 }, 6), Some(Sfx::Gem));
        assert_eq!(effect_for(&GameEvent::PlayerHit { col: 1, row: 1 }, 6), Some(Sfx::Hit));
        assert_eq!(effect_for(&GameEvent::KeyCollected { next_level: 2 }, 6), Some(Sfx::LevelClear));
        assert_eq!(effect_for(&GameEvent::GameOver { level: 1, gems: 0 }, 6), Some(Sfx::GameOver));
        assert_eq!(effect_for(&GameEvent::Restarted, 6), None);
        assert_eq!(effect_for(&GameEvent::LevelStarted { level: 2 }, 6), None);
    }

    #[test]
    fn row_blip_pitch_follows_progress() {
        assert_eq!(effect_for(&GameEvent::RowScrolled { row: 3 }, 6), Some(Sfx::RowBlip { ratio: 0.5 }));
        assert_eq!(effect_for(&GameEvent::RowScrolled { row: 0 }, 0), Some(Sfx::RowBlip { ratio: 0.0 }));
    }

    #[cfg(feature = "sound")]
    #[test]
    fn wav_header_matches_sample_count() {
        let samples = inner::gen_blip(440.0, 0.01, 0.5);
        let wav = inner::make_wav(&samples);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
    }

    #[cfg(feature = "sound")]
    #[test]
    fn playback_shares_the_encoded_buffer() {
        let wav = inner::Wav::from(inner::make_wav(&inner::gen_blip(440.0, 0.01, 0.5)));
        let first = inner::decode(&wav);
        let second = inner::decode(&wav);
        assert!(first.is_some() && second.is_some());
        assert_eq!(std::sync::Arc::strong_count(&wav), 3);
        drop((first, second));
        assert_eq!(std::sync::Arc::strong_count(&wav), 1);
    }

    #[cfg(feature = "sound")]
    #[test]
    fn generated_effects_stay_in_range() {
        for fx in inner::all_effects() {
            assert!(!fx.is_empty());
            assert!(fx.iter().all(|s| s.abs() <= 1.0));
        }
    }
}
