/*!

Named, independently seeded random number streams.

Every stochastic decision in the simulation draws from a stream declared with
[`define_rng!`]. Each stream's generator is seeded as
`base_seed + hash(stream name)`, so adding draws to one stream never perturbs
another, and a fixed base seed reproduces an entire run bit for bit.
[`ContextRandomExt::init_random`] installs the base seed and drops any
existing generators so they re-seed lazily on next use.

*/

use std::any::Any;

use rand::{
    distr::{
        uniform::{SampleRange, SampleUniform},
        weighted::{Weight, WeightedIndex},
    },
    prelude::Distribution,
    Rng, SeedableRng,
};

use crate::{
    context::{Context, DataPlugin},
    hashing::{hash_str, HashMap},
    trace, type_of, TypeId,
};

/// A named random number stream. Use [`define_rng!`] rather than implementing
/// this by hand.
pub trait RngId: Any {
    #![allow(non_upper_case_globals)]
    const new: &'static dyn Fn(u64) -> Self;
    const name: &'static str;
    type RngType: SeedableRng;
    fn rng(&mut self) -> &mut Self::RngType;
}

struct RngPlugin {
    base_seed: u64,
    // One lazily created generator per `RngId` type.
    rng_map: HashMap<TypeId, Box<dyn Any>>,
}

impl RngPlugin {
    fn clear(&mut self) {
        self.rng_map.clear();
    }

    fn get_rng<R: RngId>(&mut self) -> &mut R::RngType {
        if !self.rng_map.contains_key(&type_of::<R>()) {
            let seed = self.base_seed.wrapping_add(hash_str(R::name));
            trace!("seeding rng stream {} with {}", R::name, seed);
            self.rng_map.insert(type_of::<R>(), Box::new(R::new(seed)));
        }

        self.rng_map
            .get_mut(&type_of::<R>())
            .unwrap()
            .downcast_mut::<R>()
            .unwrap() // Will never panic as the entry was stored under R's TypeId
            .rng()
    }
}

impl DataPlugin for RngPlugin {
    #[allow(non_upper_case_globals)]
    const new: &'static dyn Fn() -> Self = &|| RngPlugin {
        base_seed: 0,
        rng_map: HashMap::default(),
    };
}

/// Gets a mutable reference to the random number generator associated with the given
/// `RngId`.
// This is a private free function so that it's not leaked to the public API.
fn get_rng<R: RngId>(context: &mut Context) -> &mut R::RngType {
    context.get_data_container_mut::<RngPlugin>().get_rng::<R>()
}

pub trait ContextRandomExt {
    /// Installs `base_seed` and drops any existing stream generators so they
    /// are re-seeded on next use. Call this before the first draw; streams
    /// touched earlier would have been seeded from the default base of 0.
    fn init_random(&mut self, base_seed: u64);

    /// Gets a random sample from the stream associated with the given `RngId`
    /// by applying the specified sampler function.
    fn sample<R: RngId + 'static, T>(
        &mut self,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T;

    /// Gets a random sample from the specified distribution using the stream
    /// associated with the given `RngId`.
    fn sample_distr<R: RngId + 'static, T>(
        &mut self,
        distribution: impl Distribution<T>,
    ) -> T
    where
        R::RngType: Rng;

    /// Gets a random sample within `range` using the stream associated with
    /// the given `RngId`.
    fn sample_range<R: RngId + 'static, S, T>(&mut self, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform;

    /// Gets a random boolean which is true with probability `p` (which must
    /// be in `[0, 1]`) using the stream associated with the given `RngId`.
    fn sample_bool<R: RngId + 'static>(&mut self, p: f64) -> bool
    where
        R::RngType: Rng;

    /// Draws an index out of `weights` with probability proportional to its
    /// weight, using the stream associated with the given `RngId`.
    fn sample_weighted<R: RngId + 'static, T>(&mut self, weights: &[T]) -> usize
    where
        R::RngType: Rng,
        T: Clone + Default + SampleUniform + for<'a> std::ops::AddAssign<&'a T> + PartialOrd + Weight;
}

impl ContextRandomExt for Context {
    fn init_random(&mut self, base_seed: u64) {
        trace!("initializing random streams with base seed {base_seed}");
        let rng_container = self.get_data_container_mut::<RngPlugin>();
        rng_container.base_seed = base_seed;

        // Clear any existing Rngs to ensure they get re-seeded when `get_rng` is called
        rng_container.clear();
    }

    fn sample<R: RngId + 'static, T>(
        &mut self,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T {
        let rng = get_rng::<R>(self);
        sampler(rng)
    }

    fn sample_distr<R: RngId + 'static, T>(
        &mut self,
        distribution: impl Distribution<T>,
    ) -> T
    where
        R::RngType: Rng,
    {
        let rng = get_rng::<R>(self);
        distribution.sample::<R::RngType>(rng)
    }

    fn sample_range<R: RngId + 'static, S, T>(&mut self, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample::<R, T>(|rng| rng.random_range(range))
    }

    fn sample_bool<R: RngId + 'static>(&mut self, p: f64) -> bool
    where
        R::RngType: Rng,
    {
        self.sample::<R, bool>(|rng| rng.random_bool(p))
    }

    fn sample_weighted<R: RngId + 'static, T>(&mut self, weights: &[T]) -> usize
    where
        R::RngType: Rng,
        T: Clone + Default + SampleUniform + for<'a> std::ops::AddAssign<&'a T> + PartialOrd + Weight,
    {
        let index = WeightedIndex::new(weights).unwrap();
        let rng = get_rng::<R>(self);
        index.sample(rng)
    }
}

/// Declares a named random number stream backed by `StdRng` (or the generator
/// type given as the second argument). The stream's seed is derived from the
/// base seed and the stream's own name.
#[macro_export]
macro_rules! define_rng {
    ($random_id:ident) => {
        $crate::define_rng!($random_id, $crate::rand::rngs::StdRng);
    };
    ($random_id:ident, $rng_type:ty) => {
        struct $random_id {
            rng: $rng_type,
        }

        impl $crate::random::RngId for $random_id {
            #![allow(non_upper_case_globals)]
            type RngType = $rng_type;
            const name: &'static str = stringify!($random_id);
            const new: &'static dyn Fn(u64) -> Self = &|seed| {
                use $crate::rand::SeedableRng;
                Self {
                    rng: <$rng_type>::seed_from_u64(seed),
                }
            };

            fn rng(&mut self) -> &mut Self::RngType {
                &mut self.rng
            }
        }
    };
}
#[allow(unused_imports)]
pub use define_rng;
