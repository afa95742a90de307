use std::f64::consts::PI;

use rand::Rng;
use rand_distr::StandardNormal;

const EPSILON: f64 = 1e-9;
/// Q of the two second-order sections making up a 4th-order Butterworth.
const BUTTERWORTH_Q: [f64; 2] = [0.541_196_10, 1.306_562_96];

#[derive(Debug, Clone, PartialEq)]
pub struct RadioEffectSettings {
    pub sample_rate: u32,
    pub low_cut_hz: f64,
    pub high_cut_hz: f64,
    pub compressor_threshold_db: f64,
    pub compressor_ratio: f64,
    pub compressor_window_ms: u32,
    pub noise_db: f64,
    pub tail_noise_db: f64,
    pub tail_ms: u32,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RadioEffectError {
    #[error("sample rate must be positive")]
    InvalidSampleRate,
    #[error("passband {low_cut_hz}-{high_cut_hz} Hz must lie between 0 and the {nyquist_hz} Hz Nyquist limit")]
    InvalidPassband {
        low_cut_hz: f64,
        high_cut_hz: f64,
        nyquist_hz: f64,
    },
    #[error("compressor ratio must be at least 1, got {0}")]
    InvalidCompressorRatio(f64),
}

impl RadioEffectSettings {
    pub fn validate(&self) -> Result<(), RadioEffectError> {
        if self.sample_rate == 0 {
            return Err(RadioEffectError::InvalidSampleRate);
        }
        let nyquist_hz = self.sample_rate as f64 / 2.0;
        let passband_ok = self.low_cut_hz > 0.0
            && self.low_cut_hz < self.high_cut_hz
            && self.high_cut_hz < nyquist_hz;
        if !passband_ok {
            return Err(RadioEffectError::InvalidPassband {
                low_cut_hz: self.low_cut_hz,
                high_cut_hz: self.high_cut_hz,
                nyquist_hz,
            });
        }
        if self.compressor_ratio.is_nan() || self.compressor_ratio < 1.0 {
            return Err(RadioEffectError::InvalidCompressorRatio(self.compressor_ratio));
        }
        Ok(())
    }
}

impl Default for RadioEffectSettings {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            low_cut_hz: 300.0,
            high_cut_hz: 3_000.0,
            compressor_threshold_db: -14.0,
            compressor_ratio: 3.0,
            compressor_window_ms: 10,
            noise_db: -32.0,
            tail_noise_db: -28.0,
            tail_ms: 70,
        }
    }
}

/// Makes clean synthesized speech sound like a VHF transmission: voice
/// passband, limiting, receiver hiss and a squelch tail.
#[derive(Debug, Clone)]
pub struct RadioEffectChain {
    settings: RadioEffectSettings,
    sections: Vec<Biquad>,
}

impl RadioEffectChain {
    pub fn new(settings: RadioEffectSettings) -> Result<Self, RadioEffectError> {
        settings.validate()?;
        Ok(Self::design(settings))
    }

    /// The same chain redesigned for audio delivered at `sample_rate`.
    pub fn for_rate(&self, sample_rate: u32) -> Result<Self, RadioEffectError> {
        Self::new(RadioEffectSettings {
            sample_rate,
            ..self.settings.clone()
        })
    }

    fn design(settings: RadioEffectSettings) -> Self {
        let fs = settings.sample_rate as f64;
        let mut sections = Vec::with_capacity(4);
        for q in BUTTERWORTH_Q {
            sections.push(Biquad::high_pass(settings.low_cut_hz, q, fs));
        }
        for q in BUTTERWORTH_Q {
            sections.push(Biquad::low_pass(settings.high_cut_hz, q, fs));
        }
        Self { settings, sections }
    }

    pub fn settings(&self) -> &RadioEffectSettings {
        &self.settings
    }

    /// Output is the processed speech followed by the squelch tail.
    pub fn apply<R: Rng + ?Sized>(&self, speech: &[f32], rng: &mut R) -> Vec<f32> {
        let filtered = self.band_pass(speech);
        let compressed = self.compress(&filtered);
        let mut out = self.add_hiss(&compressed, rng);
        out.extend(self.squelch_tail(rng));
        out
    }

    /// Zero-phase band-pass: the cascade runs forward then backward over an
    /// odd-extended copy of the signal.
    pub fn band_pass(&self, signal: &[f32]) -> Vec<f32> {
        let n = signal.len();
        if n == 0 {
            return Vec::new();
        }

        let x: Vec<f64> = signal.iter().map(|&s| s as f64).collect();
        let pad = (3 * (2 * self.sections.len() + 1)).min(n - 1);
        let extended = odd_extend(&x, pad);

        let forward = self.run_cascade(&extended);
        let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
        reversed = self.run_cascade(&reversed);
        reversed.reverse();

        reversed[pad..pad + n].iter().map(|&s| s as f32).collect()
    }

    fn run_cascade(&self, input: &[f64]) -> Vec<f64> {
        let mut buffer = input.to_vec();
        let mut level = buffer.first().copied().unwrap_or(0.0);
        for section in &self.sections {
            let mut state = section.steady_state(level);
            for sample in buffer.iter_mut() {
                *sample = section.process(*sample, &mut state);
            }
            level *= section.dc_gain();
        }
        buffer
    }

    /// Soft knee-less compression driven by a centered moving-average RMS.
    pub fn compress(&self, signal: &[f32]) -> Vec<f32> {
        let n = signal.len();
        if n == 0 {
            return Vec::new();
        }

        let window = ((self.settings.sample_rate as u64 * self.settings.compressor_window_ms as u64)
            / 1000)
            .max(1) as usize;
        let offset = (window - 1) / 2;

        let mut prefix = Vec::with_capacity(n + 1);
        prefix.push(0.0f64);
        for &s in signal {
            let last = prefix[prefix.len() - 1];
            prefix.push(last + (s as f64) * (s as f64));
        }

        let slope = 1.0 - 1.0 / self.settings.compressor_ratio;
        signal
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let hi = (i + offset).min(n - 1);
                let lo = (i + offset + 1).saturating_sub(window);
                let energy = if lo <= hi { prefix[hi + 1] - prefix[lo] } else { 0.0 };
                let mean = energy / window as f64;
                let rms = mean.max(EPSILON).sqrt();
                let level_db = 20.0 * (rms + EPSILON).log10();
                let over = (level_db - self.settings.compressor_threshold_db).max(0.0);
                let gain = 10f64.powf(-over * slope / 20.0);
                (s as f64 * gain) as f32
            })
            .collect()
    }

    pub fn add_hiss<R: Rng + ?Sized>(&self, signal: &[f32], rng: &mut R) -> Vec<f32> {
        let noise = scaled_noise(signal.len(), self.settings.noise_db, rng);
        signal.iter().zip(noise).map(|(s, n)| s + n).collect()
    }

    /// Exponentially decaying noise burst heard when the carrier drops.
    pub fn squelch_tail<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        let n = (self.settings.sample_rate as u64 * self.settings.tail_ms as u64 / 1000) as usize;
        let noise = scaled_noise(n, self.settings.tail_noise_db, rng);
        let step = if n > 1 { 5.0 / (n - 1) as f64 } else { 0.0 };
        noise
            .into_iter()
            .enumerate()
            .map(|(i, s)| s * (-(i as f64) * step).exp() as f32)
            .collect()
    }
}

impl Default for RadioEffectChain {
    fn default() -> Self {
        Self::design(RadioEffectSettings::default())
    }
}

/// Gaussian noise normalized to the given RMS level in dBFS.
fn scaled_noise<R: Rng + ?Sized>(n: usize, level_db: f64, rng: &mut R) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    let raw: Vec<f64> = (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect();
    let rms = (raw.iter().map(|x| x * x).sum::<f64>() / n as f64 + EPSILON).sqrt();
    let scale = 10f64.powf(level_db / 20.0) / rms;
    raw.into_iter().map(|x| (x * scale) as f32).collect()
}

fn odd_extend(x: &[f64], pad: usize) -> Vec<f64> {
    let n = x.len();
    let first = x[0];
    let last = x[n - 1];
    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
    out.extend_from_slice(x);
    out.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));
    out
}

/// RBJ cookbook second-order section, transposed direct form II.
#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    fn high_pass(cutoff: f64, q: f64, fs: f64) -> Self {
        let (cos_w0, alpha) = Self::prewarp(cutoff, q, fs);
        let a0 = 1.0 + alpha;
        Self {
            b0: (1.0 + cos_w0) / 2.0 / a0,
            b1: -(1.0 + cos_w0) / a0,
            b2: (1.0 + cos_w0) / 2.0 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    fn low_pass(cutoff: f64, q: f64, fs: f64) -> Self {
        let (cos_w0, alpha) = Self::prewarp(cutoff, q, fs);
        let a0 = 1.0 + alpha;
        Self {
            b0: (1.0 - cos_w0) / 2.0 / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: (1.0 - cos_w0) / 2.0 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    fn prewarp(cutoff: f64, q: f64, fs: f64) -> (f64, f64) {
        let w0 = 2.0 * PI * cutoff / fs;
        (w0.cos(), w0.sin() / (2.0 * q))
    }

    fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Delay-line state for a signal that has been constant at `level`
    /// forever, so the filter starts without a transient.
    fn steady_state(&self, level: f64) -> [f64; 2] {
        let y = level * self.dc_gain();
        let s2 = self.b2 * level - self.a2 * y;
        let s1 = self.b1 * level - self.a1 * y + s2;
        [s1, s2]
    }

    #[inline]
    fn process(&self, x: f64, state: &mut [f64; 2]) -> f64 {
        let y = self.b0 * x + state[0];
        state[0] = self.b1 * x - self.a1 * y + state[1];
        state[1] = self.b2 * x - self.a2 * y;
        y
    }
}
