/*!

The simulation context.

A [`Context`] owns every piece of simulation state as a set of data plugins,
keyed by type. Capability modules (people, contact network, random number
streams, outbreak state, reporting) each define a plugin type plus an
extension trait on `Context` that exposes their operations, so callers hold
exactly one value and the modules stay decoupled from each other.

Plugins are created lazily the first time they are requested. A type opts in
by implementing [`DataPlugin`], which names the constructor to use:

```rust
use outbreak_core::{Context, DataPlugin};

struct TallyData {
    count: u32,
}

impl DataPlugin for TallyData {
    const new: &'static dyn Fn() -> Self = &|| TallyData { count: 0 };
}

let mut context = Context::new();
context.get_data_container_mut::<TallyData>().count += 1;
```

*/

use std::any::Any;

use crate::hashing::HashMap;
use crate::type_of;
use crate::TypeId;

/// A type that can live inside a [`Context`] and construct its own initial
/// (empty) state on first access.
///
/// If the type already has an inherent `new()`, disambiguate with
/// `<T as DataPlugin>::new()` when you mean this constructor.
pub trait DataPlugin: Any + 'static {
    /// A constant reference to the plugin's constructor.
    #[allow(non_upper_case_globals)]
    const new: &'static dyn Fn() -> Self;
}

/// Holds all state for one simulation. Create one per scenario, or reuse one
/// and reinitialize; modules are responsible for resetting their own plugins.
pub struct Context {
    // Conceptually a `HashMap<TypeId, Box<dyn DataPlugin>>`, but stored as
    // `dyn Any` so containers can be downcast back to their concrete types.
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Context {
            data_plugins: HashMap::default(),
        }
    }

    /// Returns a mutable reference to the data container for `T`, creating it
    /// if it doesn't exist yet.
    pub fn get_data_container_mut<T: DataPlugin>(&mut self) -> &mut T {
        self.data_plugins
            .entry(type_of::<T>())
            .or_insert_with(|| Box::new(<T as DataPlugin>::new()))
            .downcast_mut::<T>()
            .unwrap() // Will never panic as data container has the matching type
    }

    /// Returns a reference to the data container for `T` if it exists.
    /// If you need a mutable reference or lazy instantiation, use
    /// `Context::get_data_container_mut()`.
    #[must_use]
    pub fn get_data_container<T: DataPlugin>(&self) -> Option<&T> {
        if let Some(data) = self.data_plugins.get(&type_of::<T>()) {
            data.downcast_ref::<T>()
        } else {
            None
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CounterData {
        values: Vec<u32>,
    }

    impl DataPlugin for CounterData {
        const new: &'static dyn Fn() -> Self = &|| CounterData { values: Vec::new() };
    }

    struct LabelData {
        label: String,
    }

    impl DataPlugin for LabelData {
        const new: &'static dyn Fn() -> Self = &|| LabelData {
            label: String::new(),
        };
    }

    #[test]
    fn containers_are_created_lazily() {
        let mut context = Context::new();
        assert!(context.get_data_container::<CounterData>().is_none());

        context.get_data_container_mut::<CounterData>().values.push(3);
        assert_eq!(
            context.get_data_container::<CounterData>().unwrap().values,
            vec![3]
        );
    }

    #[test]
    fn containers_of_different_types_do_not_collide() {
        let mut context = Context::new();
        context.get_data_container_mut::<CounterData>().values.push(1);
        context.get_data_container_mut::<LabelData>().label.push('x');

        assert_eq!(context.get_data_container::<CounterData>().unwrap().values, vec![1]);
        assert_eq!(context.get_data_container::<LabelData>().unwrap().label, "x");
    }

    #[test]
    fn containers_can_be_replaced_wholesale() {
        let mut context = Context::new();
        context.get_data_container_mut::<CounterData>().values.push(9);

        *context.get_data_container_mut::<CounterData>() = CounterData { values: vec![1, 2] };
        assert_eq!(
            context.get_data_container::<CounterData>().unwrap().values,
            vec![1, 2]
        );
    }
}
