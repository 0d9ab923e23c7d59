/*!

Deterministic hashing for the whole crate.

The standard library's default hasher is randomly keyed per process, which
makes hash-dependent iteration and derived seeds differ from run to run. The
simulation promises bitwise-reproducible histories for a fixed base seed, so
every map, set, and string hash in this crate goes through `rustc-hash`
instead.

*/

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

/// Hashes a string to a `u64` with the same result on every run and platform.
/// Used to derive per-stream offsets from RNG stream names.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    let mut hasher = FxHasher::default();
    data.hash(&mut hasher);
    hasher.finish()
}
