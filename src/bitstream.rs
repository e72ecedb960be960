//! Transmit bit sequences: periodic square wave and LFSR PRBS

use rand::Rng;

use crate::error::{FsoError, Result};

/// Ordered transmit bits, each 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitstream {
    bits: Vec<u8>,
}

impl Bitstream {
    /// Alternating 1/0 pattern starting with 1; the deterministic sequence
    /// used for eye-diagram-style characterisation.
    pub fn periodic(n_bits: usize) -> Result<Self> {
        if n_bits == 0 {
            return Err(FsoError::input("bitstream must contain at least one bit"));
        }
        let bits = (0..n_bits).map(|i| (i % 2 == 0) as u8).collect();
        Ok(Self { bits })
    }

    /// Pseudo-random sequence from an LFSR seeded by `rng`. Same generator
    /// state in, same sequence out.
    pub fn prbs<R: Rng>(n_bits: usize, rng: &mut R) -> Result<Self> {
        Lfsr::seeded(rng).generate(n_bits)
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Explicit sample-and-hold upsampling: each bit held for `r_f`
    /// consecutive high-rate samples.
    pub fn upsample_hold(&self, r_f: usize) -> Vec<f64> {
        let mut samples = Vec::with_capacity(self.bits.len() * r_f);
        for &bit in &self.bits {
            for _ in 0..r_f {
                samples.push(bit as f64);
            }
        }
        samples
    }
}

/// Linear-feedback shift register over a small bit register.
///
/// Output is the trailing register bit before the shift; the feedback bit is
/// the XOR of the tapped positions (1-based from the register head). Because
/// the output and insertion positions coincide, the emitted sequence follows
/// a shortened four-term recurrence and repeats every 15 bits with the
/// default taps, matching the bench generator bit for bit.
#[derive(Debug, Clone)]
pub struct Lfsr {
    state: Vec<u8>,
    taps: Vec<usize>,
}

/// Default register width.
pub const LFSR_WIDTH: usize = 5;
/// Default feedback taps (1-based register positions).
pub const LFSR_TAPS: [usize; 2] = [5, 2];

impl Lfsr {
    /// Register seeded from the supplied generator. An all-zero draw is
    /// bumped deterministically so the register cannot lock at zero.
    pub fn seeded<R: Rng>(rng: &mut R) -> Self {
        let mut state: Vec<u8> = (0..LFSR_WIDTH).map(|_| rng.gen_range(0..=1u8)).collect();
        if state.iter().all(|&b| b == 0) {
            state[LFSR_WIDTH - 1] = 1;
        }
        Self {
            state,
            taps: LFSR_TAPS.to_vec(),
        }
    }

    /// Register with explicit state and taps.
    pub fn with_state(state: Vec<u8>, taps: Vec<usize>) -> Result<Self> {
        if state.is_empty() || state.iter().all(|&b| b == 0) {
            return Err(FsoError::input("LFSR state must contain a nonzero bit"));
        }
        if taps.iter().any(|&t| t == 0 || t > state.len()) {
            return Err(FsoError::input("LFSR taps must lie within the register"));
        }
        Ok(Self { state, taps })
    }

    /// Produce `n_bits` output bits.
    pub fn generate(mut self, n_bits: usize) -> Result<Bitstream> {
        if n_bits == 0 {
            return Err(FsoError::input("bitstream must contain at least one bit"));
        }
        let mut bits = Vec::with_capacity(n_bits);
        for _ in 0..n_bits {
            let feedback = self
                .taps
                .iter()
                .fold(0u8, |acc, &t| acc ^ self.state[t - 1]);
            bits.push(self.state[self.state.len() - 1]);
            self.state.rotate_left(1);
            let last = self.state.len() - 1;
            self.state[last] = feedback;
        }
        Ok(Bitstream { bits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_periodic_alternates() {
        let bits = Bitstream::periodic(6).unwrap();
        assert_eq!(bits.bits(), &[1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_zero_bits_rejected() {
        assert!(Bitstream::periodic(0).is_err());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Bitstream::prbs(0, &mut rng).is_err());
    }

    #[test]
    fn test_prbs_reproducible_for_same_seed() {
        let a = Bitstream::prbs(200, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = Bitstream::prbs(200, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_prbs_varies_across_seeds() {
        // the register has 31 reachable states, so any pair of seeds may
        // collide; a batch of seeds must still produce distinct sequences
        let first = Bitstream::prbs(200, &mut StdRng::seed_from_u64(0)).unwrap();
        let distinct = (1u64..12)
            .map(|seed| Bitstream::prbs(200, &mut StdRng::seed_from_u64(seed)).unwrap())
            .any(|other| other != first);
        assert!(distinct);
    }

    #[test]
    fn test_default_taps_sequence_period() {
        let stream = Lfsr::with_state(vec![0, 0, 0, 0, 1], LFSR_TAPS.to_vec())
            .unwrap()
            .generate(45)
            .unwrap();
        let bits = stream.bits();
        assert_eq!(&bits[..15], &bits[15..30]);
        assert_eq!(&bits[..15], &bits[30..45]);
        // balanced like an m-sequence: 8 ones, 7 zeros per period
        assert_eq!(bits[..15].iter().filter(|&&b| b == 1).count(), 8);
        // and not period 5
        assert_ne!(&bits[..5], &bits[5..10]);
    }

    #[test]
    fn test_all_zero_state_rejected() {
        assert!(Lfsr::with_state(vec![0, 0, 0, 0, 0], LFSR_TAPS.to_vec()).is_err());
    }

    #[test]
    fn test_upsample_hold() {
        let bits = Bitstream::periodic(2).unwrap();
        assert_eq!(bits.upsample_hold(3), vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }
}
