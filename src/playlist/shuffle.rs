use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Random permutation source for the shuffled playlist.
///
/// Seeded shufflers repeat the same sequence of permutations; unseeded ones
/// draw from OS entropy.
pub struct Shuffler {
    rng: StdRng,
    seed: Option<u64>,
}

impl Shuffler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, seed }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for Shuffler {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Shuffler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shuffler").field("seed", &self.seed).finish()
    }
}
