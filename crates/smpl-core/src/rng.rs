//! # smpl-core::rng
//!
//! The kernel's pseudo-random source: the classic 7^5 mod (2^31 - 1) linear
//! congruential generator over 15 fixed seed streams, plus the standard
//! distributions built on top of it. Bit-for-bit reproducibility against the
//! named seeds is a contract (spec.md §6, §8 scenario S6), so — unlike
//! `19h-ftsim`'s `ChaCha20Rng`-backed `RngDiscipline` — this cannot defer to
//! a general-purpose RNG crate; the generator itself is the specification.
//! The wrapper shape (a small struct owning the stream state, exposing
//! labeled draw methods) is kept from that teacher module.

use smpl_types::error::KernelError;

const MODULUS: i64 = 2_147_483_647; // 2^31 - 1
const MULTIPLIER: i64 = 16_807; // 7^5

/// The 15 fixed seed streams, in stream-number order (stream 1 first).
pub const SEEDS: [i64; 15] = [
    1_973_272_912,
    747_177_549,
    20_464_843,
    640_830_765,
    1_098_742_207,
    78_126_602,
    84_743_774,
    831_312_807,
    124_667_236,
    1_172_177_002,
    1_124_933_064,
    1_223_960_546,
    1_878_892_440,
    1_449_793_615,
    553_303_732,
];

/// The kernel's random number source: one active LCG stream plus the
/// distributions derived from it.
#[derive(Debug, Clone)]
pub struct Rng {
    stream: u32,
    state: i64,
    /// Cached second variate from the Marsaglia polar method, consumed by
    /// the next `normal` call.
    spare_normal: Option<f64>,
}

impl Rng {
    /// Creates a generator already positioned on `stream` (1..=15).
    pub fn with_stream(stream: u32) -> Result<Self, KernelError> {
        if !(1..=15).contains(&stream) {
            return Err(KernelError::InvalidStream(stream));
        }
        Ok(Self {
            stream,
            state: SEEDS[(stream - 1) as usize],
            spare_normal: None,
        })
    }

    pub fn stream(&self) -> u32 {
        self.stream
    }

    /// Switches to a different stream, resetting to that stream's seed and
    /// discarding any cached normal variate.
    pub fn set_stream(&mut self, stream: u32) -> Result<(), KernelError> {
        if !(1..=15).contains(&stream) {
            return Err(KernelError::InvalidStream(stream));
        }
        self.stream = stream;
        self.state = SEEDS[(stream - 1) as usize];
        self.spare_normal = None;
        Ok(())
    }

    /// Advances the LCG and returns the next draw in (0, 1).
    pub fn ranf(&mut self) -> f64 {
        self.state = (MULTIPLIER * self.state) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Continuous uniform on `[a, b]`.
    pub fn uniform(&mut self, a: f64, b: f64) -> Result<f64, KernelError> {
        if a > b {
            return Err(KernelError::InvalidRange { a, b });
        }
        Ok(a + (b - a) * self.ranf())
    }

    /// Discrete uniform on `[i, n]` inclusive.
    pub fn random(&mut self, i: i64, n: i64) -> Result<i64, KernelError> {
        if i as f64 > n as f64 {
            return Err(KernelError::InvalidRange {
                a: i as f64,
                b: n as f64,
            });
        }
        Ok(i + ((n - i + 1) as f64 * self.ranf()).floor() as i64)
    }

    /// Exponential with mean `x`.
    pub fn expntl(&mut self, x: f64) -> f64 {
        -x * self.ranf().ln()
    }

    /// Erlang with mean `x` and standard deviation `s`. Requires `s <= x`.
    pub fn erlang(&mut self, x: f64, s: f64) -> Result<f64, KernelError> {
        if s > x {
            return Err(KernelError::InvalidErlangShape { x, s });
        }
        let k = ((x / s) * (x / s)).floor() as u64;
        let mean = x / k as f64;
        let sum: f64 = (0..k).map(|_| self.expntl(mean)).sum();
        Ok(sum)
    }

    /// Two-stage hyperexponential with mean `x` and standard deviation `s`,
    /// per Morse's formula. Requires `s > x`.
    pub fn hyperx(&mut self, x: f64, s: f64) -> Result<f64, KernelError> {
        if s <= x {
            return Err(KernelError::InvalidHyperxShape { x, s });
        }
        let cv2 = (s * s) / (x * x);
        let p = 0.5 * (1.0 - ((cv2 - 1.0) / (cv2 + 1.0)).sqrt());
        let mean = if self.ranf() > p {
            0.5 * x / (1.0 - p)
        } else {
            0.5 * x / p
        };
        Ok(self.expntl(mean))
    }

    /// Normal with mean `x` and standard deviation `s`, via the Marsaglia
    /// polar method. Every other call serves a cached second variate
    /// without drawing fresh uniforms.
    pub fn normal(&mut self, x: f64, s: f64) -> f64 {
        if let Some(spare) = self.spare_normal.take() {
            return x + s * spare;
        }
        loop {
            let u = 2.0 * self.ranf() - 1.0;
            let v = 2.0 * self.ranf() - 1.0;
            let w = u * u + v * v;
            if w > 0.0 && w < 1.0 {
                let c = (-2.0 * w.ln() / w).sqrt();
                self.spare_normal = Some(v * c);
                return x + s * (u * c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_rotation_starts_at_the_named_seed() {
        let rng = Rng::with_stream(3).unwrap();
        assert_eq!(rng.state, SEEDS[2]);
        assert_eq!(rng.stream(), 3);
    }

    #[test]
    fn ranf_follows_the_specified_lcg_exactly() {
        let mut rng = Rng::with_stream(3).unwrap();
        let expected = (MULTIPLIER * SEEDS[2]) % MODULUS;
        let draw = rng.ranf();
        assert_eq!(rng.state, expected);
        assert!((draw - expected as f64 / MODULUS as f64).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_stream_is_rejected() {
        assert!(Rng::with_stream(0).is_err());
        assert!(Rng::with_stream(16).is_err());
    }

    #[test]
    fn uniform_requires_a_le_b() {
        let mut rng = Rng::with_stream(1).unwrap();
        assert!(rng.uniform(5.0, 1.0).is_err());
        let v = rng.uniform(1.0, 5.0).unwrap();
        assert!((1.0..=5.0).contains(&v));
    }

    #[test]
    fn erlang_rejects_s_greater_than_x() {
        let mut rng = Rng::with_stream(1).unwrap();
        assert!(rng.erlang(1.0, 2.0).is_err());
        assert!(rng.erlang(10.0, 2.0).is_ok());
    }

    #[test]
    fn hyperx_rejects_s_le_x() {
        let mut rng = Rng::with_stream(1).unwrap();
        assert!(rng.hyperx(10.0, 5.0).is_err());
        assert!(rng.hyperx(5.0, 10.0).is_ok());
    }

    #[test]
    fn normal_caches_the_second_polar_variate() {
        let mut rng = Rng::with_stream(1).unwrap();
        let _ = rng.normal(0.0, 1.0);
        assert!(rng.spare_normal.is_some());
        let state_before_second_call = rng.state;
        let _ = rng.normal(0.0, 1.0);
        assert_eq!(rng.state, state_before_second_call);
        assert!(rng.spare_normal.is_none());
    }
}
