use rand::{Rng, seq::SliceRandom};

use crate::quiz::controller::{LevelController, SliceOutcome};

/// Fewest fruits a wave can hold: the right answer and one decoy.
pub const MIN_WAVE_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FruitKind {
    Apple,
    Banana,
    Coconut,
    Lemon,
    Orange,
    Pineapple,
    Strawberry,
    Watermelon,
}

impl FruitKind {
    pub const ALL: [FruitKind; 8] = [
        FruitKind::Apple,
        FruitKind::Banana,
        FruitKind::Coconut,
        FruitKind::Lemon,
        FruitKind::Orange,
        FruitKind::Pineapple,
        FruitKind::Strawberry,
        FruitKind::Watermelon,
    ];
}

impl std::fmt::Display for FruitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A fruit on screen carrying a candidate answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fruit {
    pub kind: FruitKind,
    pub value: i64,
    sliced: bool,
}

impl Fruit {
    pub fn new(kind: FruitKind, value: i64) -> Self {
        Self { kind, value, sliced: false }
    }

    pub fn is_sliced(&self) -> bool {
        self.sliced
    }

    /// Cuts the fruit and reports its value to the level. A fruit can only be cut once.
    pub fn slice(&mut self, controller: &mut LevelController) -> SliceOutcome {
        if self.sliced {
            return SliceOutcome::Ignored;
        }

        let outcome = controller.slice(self.value);
        if outcome != SliceOutcome::Ignored {
            self.sliced = true;
        }
        outcome
    }
}

impl std::fmt::Display for Fruit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} {}]", self.kind, self.value)
    }
}

/// Builds waves of fruit: the right answer plus distinct decoys close to it.
pub struct Spawner<R: Rng> {
    rng: R,
    wave_size: usize,
}

impl<R: Rng> Spawner<R> {
    pub fn new(rng: R, wave_size: usize) -> Self {
        Self { rng, wave_size: wave_size.max(MIN_WAVE_SIZE) }
    }

    pub fn wave_size(&self) -> usize {
        self.wave_size
    }

    pub fn wave(&mut self, answer: i64) -> Vec<Fruit> {
        let spread = (self.wave_size as i64 * 2).max(5);

        let mut values = vec![answer];
        while values.len() < self.wave_size {
            let offset = self.rng.random_range(1..=spread);
            let decoy = if self.rng.random_bool(0.5) { answer + offset } else { answer - offset };
            if !values.contains(&decoy) {
                values.push(decoy);
            }
        }
        values.shuffle(&mut self.rng);

        values
            .into_iter()
            .map(|value| {
                let kind = FruitKind::ALL[self.rng.random_range(0..FruitKind::ALL.len())];
                Fruit::new(kind, value)
            })
            .collect()
    }
}
