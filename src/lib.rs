/*!

`outbreak-core` simulates a vaccination game on a small contact network,
plus a deterministic outbreak-investigation game, for educational front ends.

The outbreak model lives in a [`Context`] that owns all state; capabilities
are exposed through extension traits:

```rust
use outbreak_core::{Context, ContextOutbreakExt, ContextPeopleExt, HealthStatus, Parameters};

let mut context = Context::new();
context
    .init_outbreak(Parameters::for_difficulty(30, 42, "normal"))
    .unwrap();

// Spend this round's doses, then let the round play out.
let target = context.people_with_status(HealthStatus::Susceptible)[0];
context.vaccinate(target).unwrap();
let report = context.advance_round().unwrap();
assert_eq!(report.round, 1);
```

Runs are reproducible: the same [`Parameters`] (including the seed) replay
the same scenario, round for round.

*/

pub mod context;
pub mod error;
pub mod hashing;
pub mod investigation;
pub mod log;
pub mod network;
pub mod outbreak;
pub mod parameters;
pub mod people;
pub mod random;
pub mod report;

use std::fmt;

use serde::{Deserialize, Serialize};

// Re-exported because `define_rng!` expands to paths under `$crate::rand`.
pub use rand;

pub use crate::context::{Context, DataPlugin};
pub use crate::error::OutbreakError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::network::ContextNetworkExt;
pub use crate::outbreak::{
    ContextOutbreakExt, GraphSnapshot, NodeSnapshot, OutbreakStatus, OutbreakSummary, RoundReport,
    Transmission,
};
pub use crate::parameters::{Difficulty, Parameters};
pub use crate::people::{ContextPeopleExt, HealthStatus, Position};
pub use crate::random::{ContextRandomExt, RngId};
pub use crate::report::ContextReportExt;

// All modules import `crate::TypeId` in case we want to change the underlying type of `TypeId`.
pub(crate) use std::any::TypeId;

#[inline(always)]
#[must_use]
pub fn type_of<T: 'static>() -> TypeId {
    TypeId::of::<T>()
}

/// A person's identity: a dense index into the current population. Ids are
/// only meaningful within the scenario that issued them.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct PersonId(pub(crate) usize);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
