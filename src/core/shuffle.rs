use rand::Rng;
use crate::models::Participant;

/// Source of uniform random indices for the fairness shuffle
///
/// Any `rand::Rng` works, so production passes an entropy-seeded generator
/// and tests pass a seeded one.
pub trait RandomSource {
    /// Uniform index in `0..upper`. `upper` is never zero.
    fn next_index(&mut self, upper: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    #[inline]
    fn next_index(&mut self, upper: usize) -> usize {
        self.gen_range(0..upper)
    }
}

/// Fisher-Yates shuffle over borrowed items.
///
/// Returns a new ordering and leaves `items` untouched.
pub fn fisher_yates<'a, T, R>(items: &'a [T], rng: &mut R) -> Vec<&'a T>
where
    R: RandomSource + ?Sized,
{
    let mut order: Vec<&T> = items.iter().collect();
    for i in (1..order.len()).rev() {
        let j = rng.next_index(i + 1);
        order.swap(i, j);
    }
    order
}

/// Independently shuffle the host and guest pools
pub fn shuffle_pools<'a, R>(
    hosts: &[&'a Participant],
    guests: &[&'a Participant],
    rng: &mut R,
) -> (Vec<&'a Participant>, Vec<&'a Participant>)
where
    R: RandomSource + ?Sized,
{
    let hosts = fisher_yates(hosts, rng).into_iter().copied().collect();
    let guests = fisher_yates(guests, rng).into_iter().copied().collect();
    (hosts, guests)
}
