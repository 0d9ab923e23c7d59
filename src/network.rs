/*!

The contact network.

An undirected graph over the current population, generated once per scenario
and never rewired afterwards. Each person proposes a small random number of
contacts; proposals that point at the proposer or duplicate an existing pair
are dropped rather than redrawn, so degrees vary and a person can end up
isolated. Edges are stored both as adjacency lists (for per-person queries)
and as a normalized edge list (for snapshots).

*/

use std::ops::RangeInclusive;

use crate::{
    context::{Context, DataPlugin},
    define_rng,
    hashing::HashSet,
    people::ContextPeopleExt,
    random::ContextRandomExt,
    trace, PersonId,
};

define_rng!(ContactRng);

#[derive(Default)]
pub(crate) struct ContactNetwork {
    adjacency: Vec<Vec<PersonId>>,
    // Every pair appears once, as (lower id, higher id).
    edges: Vec<(PersonId, PersonId)>,
    edge_set: HashSet<(usize, usize)>,
}

impl DataPlugin for ContactNetwork {
    const new: &'static dyn Fn() -> Self = &ContactNetwork::default;
}

impl ContactNetwork {
    fn reset(&mut self, population: usize) {
        self.adjacency = vec![Vec::new(); population];
        self.edges.clear();
        self.edge_set.clear();
    }

    /// Adds the undirected edge `a -- b` unless it is a self loop or already
    /// present. Returns whether the edge was added.
    fn try_add_contact(&mut self, a: PersonId, b: PersonId) -> bool {
        if a == b {
            return false;
        }
        let key = (a.0.min(b.0), a.0.max(b.0));
        if !self.edge_set.insert(key) {
            return false;
        }
        self.adjacency[a.0].push(b);
        self.adjacency[b.0].push(a);
        self.edges.push((PersonId(key.0), PersonId(key.1)));
        true
    }
}

pub trait ContextNetworkExt {
    /// The person's contacts, in the order the edges were created.
    ///
    /// Panics if `person_id` does not belong to the current population.
    fn get_contacts(&self, person_id: PersonId) -> &[PersonId];

    /// The person's degree in the contact network.
    fn get_contact_count(&self, person_id: PersonId) -> usize;

    /// All edges, each pair listed once as (lower id, higher id).
    fn get_edges(&self) -> &[(PersonId, PersonId)];

    fn has_contact(&self, a: PersonId, b: PersonId) -> bool;
}

impl ContextNetworkExt for Context {
    fn get_contacts(&self, person_id: PersonId) -> &[PersonId] {
        &self.get_data_container::<ContactNetwork>().unwrap().adjacency[person_id.0]
    }

    fn get_contact_count(&self, person_id: PersonId) -> usize {
        self.get_contacts(person_id).len()
    }

    fn get_edges(&self) -> &[(PersonId, PersonId)] {
        match self.get_data_container::<ContactNetwork>() {
            None => &[],
            Some(network) => &network.edges,
        }
    }

    fn has_contact(&self, a: PersonId, b: PersonId) -> bool {
        match self.get_data_container::<ContactNetwork>() {
            None => false,
            Some(network) => network.edge_set.contains(&(a.0.min(b.0), a.0.max(b.0))),
        }
    }
}

pub(crate) trait ContextNetworkExtInternal {
    /// Rebuilds the network over the current population. Each person proposes
    /// between `proposals_per_person.start()` and `.end()` contacts, each
    /// aimed at a uniformly random person; self loops and duplicate pairs are
    /// dropped without a redraw.
    fn generate_contacts(&mut self, proposals_per_person: RangeInclusive<usize>);
}

impl ContextNetworkExtInternal for Context {
    fn generate_contacts(&mut self, proposals_per_person: RangeInclusive<usize>) {
        let population = self.get_current_population();

        // Draw every proposal before touching the network plugin.
        let mut proposals: Vec<(PersonId, PersonId)> = Vec::new();
        for person in 0..population {
            let count = self.sample_range::<ContactRng, _, usize>(proposals_per_person.clone());
            for _ in 0..count {
                let target = self.sample_range::<ContactRng, _, usize>(0..population);
                proposals.push((PersonId(person), PersonId(target)));
            }
        }

        let network = self.get_data_container_mut::<ContactNetwork>();
        network.reset(population);
        let mut dropped = 0_usize;
        for (a, b) in proposals {
            if !network.try_add_contact(a, b) {
                dropped += 1;
            }
        }
        trace!(
            "generated contact network: {} edges, {dropped} proposals dropped",
            network.edges.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::people::Position;

    const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    fn network_context(population: usize, seed: u64) -> Context {
        let mut context = Context::new();
        context.init_random(seed);
        for _ in 0..population {
            context.add_person(ORIGIN);
        }
        context.generate_contacts(1..=3);
        context
    }

    #[test]
    fn no_self_loops_or_duplicate_pairs() {
        let context = network_context(40, 7);
        let mut seen = HashSet::default();
        for &(a, b) in context.get_edges() {
            assert_ne!(a, b);
            assert!(a < b, "edges are normalized as (lower, higher)");
            assert!(seen.insert((a, b)), "edge {a}--{b} listed twice");
        }
    }

    #[test]
    fn adjacency_is_symmetric() {
        let context = network_context(40, 7);
        for person in 0..40 {
            let person = PersonId(person);
            for &contact in context.get_contacts(person) {
                assert!(context.get_contacts(contact).contains(&person));
                assert!(context.has_contact(person, contact));
                assert!(context.has_contact(contact, person));
            }
        }
    }

    #[test]
    fn degrees_sum_to_twice_the_edge_count() {
        let context = network_context(40, 7);
        let degree_sum: usize = (0..40)
            .map(|person| context.get_contact_count(PersonId(person)))
            .sum();
        assert_eq!(degree_sum, 2 * context.get_edges().len());
    }

    #[test]
    fn edge_count_is_bounded_by_total_proposals() {
        let context = network_context(40, 7);
        assert!(!context.get_edges().is_empty());
        assert!(context.get_edges().len() <= 40 * 3);
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let first = network_context(30, 11);
        let second = network_context(30, 11);
        assert_eq!(first.get_edges(), second.get_edges());

        let other_seed = network_context(30, 12);
        assert_ne!(first.get_edges(), other_seed.get_edges());
    }

    #[test]
    fn single_person_network_has_no_edges() {
        // Every proposal is a self loop, and all of them are dropped.
        let context = network_context(1, 5);
        assert!(context.get_edges().is_empty());
        assert_eq!(context.get_contact_count(PersonId(0)), 0);
    }

    #[test]
    fn regeneration_replaces_the_old_network() {
        let mut context = Context::new();
        context.init_random(3);
        for _ in 0..20 {
            context.add_person(ORIGIN);
        }
        context.generate_contacts(1..=3);
        let first_edges = context.get_edges().to_vec();

        context.generate_contacts(1..=3);
        let second_edges = context.get_edges().to_vec();

        // Old edges are gone, not accumulated.
        assert!(second_edges.len() <= 20 * 3);
        assert_ne!(first_edges, second_edges);
    }
}
