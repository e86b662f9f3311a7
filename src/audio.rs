//! Celebration jingle playback.
//!
//! The jingle itself is synthesized, a short ascending run of decaying
//! sine plucks, so the viewer ships no audio assets. Playback goes through
//! `rodio` behind the `audio` feature; without the feature, or when no
//! output device can be opened, the handle stays inert and every call is a
//! no-op.

const SAMPLE_RATE: u32 = 44_100;

/// Synthesized celebration arpeggio, 44.1 kHz mono.
pub(crate) fn jingle_samples() -> Vec<f32> {
    use std::f32::consts::TAU;

    // (frequency Hz, onset seconds): C5 up to E6.
    const NOTES: [(f32, f32); 5] = [
        (523.25, 0.0),
        (659.25, 0.12),
        (783.99, 0.24),
        (1046.50, 0.36),
        (1318.51, 0.48),
    ];
    const TAIL: f32 = 0.9;

    let rate = SAMPLE_RATE as f32;
    let total = NOTES[NOTES.len() - 1].1 + TAIL;
    let mut samples = vec![0.0f32; (rate * total) as usize];

    for (freq, onset) in NOTES {
        let start = (rate * onset) as usize;
        for (i, sample) in samples[start..].iter_mut().enumerate() {
            let t = i as f32 / rate;
            let envelope = (-t * 6.0).exp();
            *sample += (TAU * freq * t).sin() * envelope * 0.2;
        }
    }
    samples
}

#[cfg(feature = "audio")]
mod backend {
    use rodio::{buffer::SamplesBuffer, OutputStream, OutputStreamHandle, Source};

    /// Plays the celebration jingle through the default output device.
    ///
    /// Owns the output stream for the life of the viewer. When no device
    /// can be opened the handle is created silent instead of failing.
    pub struct Jingle {
        output: Option<(OutputStream, OutputStreamHandle)>,
    }

    impl Jingle {
        pub fn new() -> Self {
            let output = match OutputStream::try_default() {
                Ok(pair) => Some(pair),
                Err(e) => {
                    eprintln!("Audio output unavailable: {} (celebration will be silent)", e);
                    None
                }
            };
            Self { output }
        }

        /// Whether an output device was opened.
        pub fn is_audible(&self) -> bool {
            self.output.is_some()
        }

        /// Start the jingle. Overlapping invocations mix.
        pub fn play(&self) {
            if let Some((_stream, handle)) = &self.output {
                let source = SamplesBuffer::new(1, super::SAMPLE_RATE, super::jingle_samples());
                let _ = handle.play_raw(source.convert_samples());
            }
        }
    }

    impl Default for Jingle {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(not(feature = "audio"))]
mod backend {
    /// Inert stand-in compiled when the `audio` feature is off.
    #[derive(Default)]
    pub struct Jingle;

    impl Jingle {
        pub fn new() -> Self {
            Jingle
        }

        pub fn is_audible(&self) -> bool {
            false
        }

        pub fn play(&self) {}
    }
}

pub use backend::Jingle;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jingle_samples_are_normalized() {
        let samples = jingle_samples();
        assert!(!samples.is_empty());
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_jingle_decays_to_silence() {
        let samples = jingle_samples();
        let tenth = samples.len() / 10;
        let rms = |window: &[f32]| {
            (window.iter().map(|s| s * s).sum::<f32>() / window.len() as f32).sqrt()
        };
        assert!(rms(&samples[samples.len() - tenth..]) < rms(&samples[..tenth]) * 0.2);
    }

    #[cfg(not(feature = "audio"))]
    #[test]
    fn test_stub_jingle_is_silent() {
        let jingle = Jingle::new();
        assert!(!jingle.is_audible());
        jingle.play();
    }
}
