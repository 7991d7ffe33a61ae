//! Mixes the APU's five channel outputs into a queue of `f32` samples.
//!
//! The NES mixes pulse1/pulse2 and triangle/noise/DMC through two separate
//! non-linear lookup curves rather than a straight sum; the formulas below
//! are the standard approximations published on nesdev.org. Samples are
//! produced at the APU's own rate (once per CPU cycle) and queued for the
//! frontend, which is responsible for resampling to its output device rate.

use std::collections::VecDeque;

/// Queues mixed audio samples produced by [`crate::apu::Apu`].
#[derive(Debug, Clone)]
pub struct NesSoundMixer {
    volume: f32,
    queue: VecDeque<f32>,
}

impl NesSoundMixer {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            queue: VecDeque::new(),
        }
    }

    /// Master volume in `0.0..=1.0`.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Mixes one cycle's worth of channel outputs and queues the sample.
    ///
    /// `pulse1`/`pulse2` are in `0..=15`, `triangle`/`noise` in `0..=15`, and
    /// `dmc` in `0..=127`, matching each channel's DAC width.
    pub fn push_sample(&mut self, pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) {
        let sample = Self::mix(pulse1, pulse2, triangle, noise, dmc) * self.volume;
        self.queue.push_back(sample);
    }

    /// Removes and returns every sample queued since the last drain.
    pub fn drain(&mut self) -> Vec<f32> {
        self.queue.drain(..).collect()
    }

    /// Number of samples currently queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn mix(pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
        Self::mix_pulse(pulse1, pulse2) + Self::mix_tnd(triangle, noise, dmc)
    }

    /// `pulse_out = 95.88 / (8128 / (pulse1 + pulse2) + 100)`
    fn mix_pulse(pulse1: u8, pulse2: u8) -> f32 {
        let sum = pulse1 as f32 + pulse2 as f32;
        if sum == 0.0 {
            0.0
        } else {
            95.88 / (8128.0 / sum + 100.0)
        }
    }

    /// `tnd_out = 159.79 / (1 / (triangle/8227 + noise/12241 + dmc/22638) + 100)`
    fn mix_tnd(triangle: u8, noise: u8, dmc: u8) -> f32 {
        let sum = triangle as f32 / 8227.0 + noise as f32 / 12241.0 + dmc as f32 / 22638.0;
        if sum == 0.0 {
            0.0
        } else {
            159.79 / (1.0 / sum + 100.0)
        }
    }
}

impl Default for NesSoundMixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_mixes_to_zero() {
        let mixer = NesSoundMixer::new();
        assert_eq!(NesSoundMixer::mix(0, 0, 0, 0, 0), 0.0);
        let _ = mixer;
    }

    #[test]
    fn full_pulse_output_is_positive_and_bounded() {
        let sample = NesSoundMixer::mix(15, 15, 0, 0, 0);
        assert!(sample > 0.0 && sample < 1.0);
    }

    #[test]
    fn push_sample_applies_volume() {
        let mut mixer = NesSoundMixer::new();
        mixer.set_volume(0.5);
        mixer.push_sample(15, 15, 15, 15, 127);
        let full = NesSoundMixer::mix(15, 15, 15, 15, 127);
        let samples = mixer.drain();
        assert_eq!(samples.len(), 1);
        assert!((samples[0] - full * 0.5).abs() < 1e-6);
    }

    #[test]
    fn drain_empties_the_queue() {
        let mut mixer = NesSoundMixer::new();
        mixer.push_sample(0, 0, 0, 0, 0);
        mixer.push_sample(0, 0, 0, 0, 0);
        assert_eq!(mixer.drain().len(), 2);
        assert!(mixer.is_empty());
    }

    #[test]
    fn volume_is_clamped() {
        let mut mixer = NesSoundMixer::new();
        mixer.set_volume(2.0);
        assert_eq!(mixer.volume(), 1.0);
        mixer.set_volume(-1.0);
        assert_eq!(mixer.volume(), 0.0);
    }
}
