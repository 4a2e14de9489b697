//! RNG oracle for deterministic random selection.
//!
//! Target and attack selection for AI combatants and echo targeting draw from
//! an [`RngOracle`]. Given the same battle seed, a battle replays identically.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform index in `0..len`. Returns 0 when `len` is 0 or 1.
    fn pick_index(&self, seed: u64, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_u32(seed) as usize) % len
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Purpose of a roll, mixed into the seed so rolls in one turn are independent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum RollContext {
    Target = 0,
    Attack = 1,
    EchoTarget = 2,
}

/// Derives the seed for one roll.
///
/// * `battle_seed` - Base seed fixed at battle start
/// * `roll` - Roll counter, incremented after every roll
/// * `actor` - Combatant the roll is for
/// * `context` - What the roll decides
pub fn compute_seed(battle_seed: u64, roll: u64, actor: u32, context: RollContext) -> u64 {
    let mut hash = battle_seed;
    hash ^= roll.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Roll source for one battle: a fixed seed plus a counter advanced per roll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dice {
    seed: u64,
    rolls: u64,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        Self { seed, rolls: 0 }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of rolls made so far.
    pub fn rolls(&self) -> u64 {
        self.rolls
    }

    /// Uniform index in `0..len` for `actor`'s roll of kind `context`.
    pub fn pick(
        &mut self,
        rng: &dyn RngOracle,
        actor: u32,
        context: RollContext,
        len: usize,
    ) -> usize {
        let seed = compute_seed(self.seed, self.rolls, actor, context);
        self.rolls += 1;
        rng.pick_index(seed, len)
    }
}
