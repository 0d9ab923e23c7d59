/*!

People and their health.

Each person is a node in the contact network, identified by a dense
[`PersonId`] index. A person carries exactly two attributes: a fixed
[`Position`] used by renderers, and a [`HealthStatus`] that the outbreak
module transitions. Statuses only ever move forward: `Susceptible` people can
become `Infected` or `Vaccinated`, `Infected` people can become `Deceased`,
and `Vaccinated` and `Deceased` are final.

*/

use serde::{Deserialize, Serialize};

use crate::{
    context::{Context, DataPlugin},
    trace, PersonId,
};

/// Where a person stands in the outbreak.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Susceptible,
    Infected,
    Vaccinated,
    Deceased,
}

impl HealthStatus {
    #[must_use]
    pub fn is_susceptible(self) -> bool {
        matches!(self, HealthStatus::Susceptible)
    }

    #[must_use]
    pub fn is_infected(self) -> bool {
        matches!(self, HealthStatus::Infected)
    }

    /// True for statuses that never change again.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(self, HealthStatus::Vaccinated | HealthStatus::Deceased)
    }
}

/// A fixed point in the layout ball. Purely cosmetic: positions exist so a
/// renderer can draw the same graph the model simulates on.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// Scales a point sampled from the unit ball out to the layout radius.
    #[must_use]
    pub(crate) fn from_unit(unit: [f32; 3], radius: f32) -> Self {
        Position {
            x: unit[0] * radius,
            y: unit[1] * radius,
            z: unit[2] * radius,
        }
    }
}

#[derive(Default)]
pub(crate) struct PeopleData {
    statuses: Vec<HealthStatus>,
    positions: Vec<Position>,
}

impl DataPlugin for PeopleData {
    const new: &'static dyn Fn() -> Self = &PeopleData::default;
}

impl PeopleData {
    fn add_person(&mut self, position: Position) -> PersonId {
        let person_id = PersonId(self.statuses.len());
        self.statuses.push(HealthStatus::Susceptible);
        self.positions.push(position);
        person_id
    }

    pub(crate) fn statuses(&self) -> &[HealthStatus] {
        &self.statuses
    }
}

pub trait ContextPeopleExt {
    fn get_current_population(&self) -> usize;

    /// Adds a new susceptible person at the given position.
    fn add_person(&mut self, position: Position) -> PersonId;

    /// Gets the person's health status.
    ///
    /// Panics if `person_id` does not belong to the current population.
    fn get_health_status(&self, person_id: PersonId) -> HealthStatus;

    /// Gets the person's fixed layout position.
    ///
    /// Panics if `person_id` does not belong to the current population.
    fn get_position(&self, person_id: PersonId) -> Position;

    /// Counts people currently in `status`.
    fn count_with_status(&self, status: HealthStatus) -> usize;

    /// Lists people currently in `status`, in ascending id order.
    fn people_with_status(&self, status: HealthStatus) -> Vec<PersonId>;
}

impl ContextPeopleExt for Context {
    fn get_current_population(&self) -> usize {
        match self.get_data_container::<PeopleData>() {
            None => 0,
            Some(people_data) => people_data.statuses.len(),
        }
    }

    fn add_person(&mut self, position: Position) -> PersonId {
        self.get_data_container_mut::<PeopleData>().add_person(position)
    }

    fn get_health_status(&self, person_id: PersonId) -> HealthStatus {
        self.get_data_container::<PeopleData>().unwrap().statuses[person_id.0]
    }

    fn get_position(&self, person_id: PersonId) -> Position {
        self.get_data_container::<PeopleData>().unwrap().positions[person_id.0]
    }

    fn count_with_status(&self, status: HealthStatus) -> usize {
        match self.get_data_container::<PeopleData>() {
            None => 0,
            Some(people_data) => people_data
                .statuses
                .iter()
                .filter(|&&current| current == status)
                .count(),
        }
    }

    fn people_with_status(&self, status: HealthStatus) -> Vec<PersonId> {
        match self.get_data_container::<PeopleData>() {
            None => Vec::new(),
            Some(people_data) => people_data
                .statuses
                .iter()
                .enumerate()
                .filter(|&(_, &current)| current == status)
                .map(|(index, _)| PersonId(index))
                .collect(),
        }
    }
}

pub(crate) trait ContextPeopleExtInternal {
    /// Overwrites the person's status. Callers enforce the legal transitions.
    fn set_health_status(&mut self, person_id: PersonId, status: HealthStatus);
}

impl ContextPeopleExtInternal for Context {
    fn set_health_status(&mut self, person_id: PersonId, status: HealthStatus) {
        trace!("person {person_id} -> {status:?}");
        self.get_data_container_mut::<PeopleData>().statuses[person_id.0] = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[test]
    fn population_starts_empty_and_grows_densely() {
        let mut context = Context::new();
        assert_eq!(context.get_current_population(), 0);

        let first = context.add_person(ORIGIN);
        let second = context.add_person(ORIGIN);
        assert_ne!(first, second);
        assert_eq!(context.get_current_population(), 2);
    }

    #[test]
    fn new_people_are_susceptible() {
        let mut context = Context::new();
        let person = context.add_person(ORIGIN);
        assert_eq!(context.get_health_status(person), HealthStatus::Susceptible);
    }

    #[test]
    fn set_health_status_overwrites() {
        let mut context = Context::new();
        let person = context.add_person(ORIGIN);

        context.set_health_status(person, HealthStatus::Infected);
        assert_eq!(context.get_health_status(person), HealthStatus::Infected);

        context.set_health_status(person, HealthStatus::Deceased);
        assert_eq!(context.get_health_status(person), HealthStatus::Deceased);
    }

    #[test]
    fn counts_and_listings_agree() {
        let mut context = Context::new();
        for _ in 0..5 {
            context.add_person(ORIGIN);
        }
        context.set_health_status(PersonId(1), HealthStatus::Infected);
        context.set_health_status(PersonId(4), HealthStatus::Infected);

        assert_eq!(context.count_with_status(HealthStatus::Susceptible), 3);
        assert_eq!(context.count_with_status(HealthStatus::Infected), 2);
        assert_eq!(
            context.people_with_status(HealthStatus::Infected),
            vec![PersonId(1), PersonId(4)]
        );
    }

    #[test]
    fn listings_are_in_ascending_id_order() {
        let mut context = Context::new();
        for _ in 0..4 {
            context.add_person(ORIGIN);
        }
        context.set_health_status(PersonId(3), HealthStatus::Vaccinated);
        context.set_health_status(PersonId(0), HealthStatus::Vaccinated);

        assert_eq!(
            context.people_with_status(HealthStatus::Vaccinated),
            vec![PersonId(0), PersonId(3)]
        );
    }

    #[test]
    fn positions_are_stored_per_person() {
        let mut context = Context::new();
        let person = context.add_person(Position {
            x: 1.0,
            y: -2.0,
            z: 0.5,
        });
        let position = context.get_position(person);
        assert_eq!(position.x, 1.0);
        assert_eq!(position.y, -2.0);
        assert_eq!(position.z, 0.5);
    }

    #[test]
    fn from_unit_scales_by_radius() {
        let position = Position::from_unit([0.5, -0.5, 1.0], 100.0);
        assert_eq!(position.x, 50.0);
        assert_eq!(position.y, -50.0);
        assert_eq!(position.z, 100.0);
    }

    #[test]
    fn status_predicates_match_their_variants() {
        assert!(HealthStatus::Susceptible.is_susceptible());
        assert!(!HealthStatus::Vaccinated.is_susceptible());

        assert!(HealthStatus::Infected.is_infected());
        assert!(!HealthStatus::Deceased.is_infected());

        assert!(!HealthStatus::Susceptible.is_final());
        assert!(!HealthStatus::Infected.is_final());
        assert!(HealthStatus::Vaccinated.is_final());
        assert!(HealthStatus::Deceased.is_final());
    }
}
