/*!

The outbreak engine.

Drives the round loop of the containment game: a scenario starts with one
infected seed case on a fresh contact network, the player spends a per-round
vaccine budget, and [`ContextOutbreakExt::advance_round`] resolves one round
of transmission and fatality. Rounds use the state as it stood when the round
began; infections and deaths planned during a round are applied together at
its end, so nobody infected this round transmits or dies until the next one.

Transmission is per contact: an infected person with degree `d` exposes each
of their contacts with probability `transmissibility / d`. Draws are compared
unclamped, which is how late rounds reach certainty once escalation pushes
the per-contact probability past 1. A contact that is not susceptible, or
that an earlier infector already reached this round, is skipped before any
draw, so exactly one draw decides each potential new case.

*/

use rand::Rng;
use rand_distr::UnitBall;
use serde::Serialize;

use crate::{
    context::{Context, DataPlugin},
    debug, define_rng,
    error::OutbreakError,
    hashing::HashSet,
    network::{ContextNetworkExt, ContextNetworkExtInternal},
    parameters::Parameters,
    people::{ContextPeopleExt, ContextPeopleExtInternal, HealthStatus, PeopleData, Position},
    random::ContextRandomExt,
    trace, PersonId,
};

define_rng!(PositionRng);
define_rng!(SeedCaseRng);
define_rng!(TransmissionRng);
define_rng!(FatalityRng);

/// How a scenario stands after the most recent round.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum OutbreakStatus {
    /// At least one person is infected and at least one is alive.
    Continuing,
    /// Nobody is infected and somebody survived.
    Victory,
    /// Everybody is deceased.
    TotalLoss,
}

/// One successful exposure: `from` infected `to` this round.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Transmission {
    pub from: PersonId,
    pub to: PersonId,
}

/// What happened during one completed round.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundReport {
    /// The round that just completed (the first round is 1).
    pub round: u32,
    pub transmissions: Vec<Transmission>,
    /// People newly infected this round, in the order they were reached.
    pub new_infections: Vec<PersonId>,
    /// People who died this round, in ascending id order.
    pub new_deaths: Vec<PersonId>,
    /// The transmissibility that was in effect during this round.
    pub transmissibility: f64,
    /// The fatality probability that was in effect during this round.
    pub fatality_probability: f64,
    /// The scenario status after applying this round's outcomes.
    pub status: OutbreakStatus,
}

/// A census of the scenario as it currently stands.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutbreakSummary {
    pub population: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub vaccinated: usize,
    pub deceased: usize,
    /// The upcoming round number; 1 until the first `advance_round`.
    pub round: u32,
    pub vaccine_budget: u32,
    pub seed_case: PersonId,
    pub status: OutbreakStatus,
}

/// Everything a renderer needs to draw the scenario.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<(PersonId, PersonId)>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: PersonId,
    pub position: Position,
    pub status: HealthStatus,
}

pub(crate) struct OutbreakData {
    /// The upcoming round number.
    round: u32,
    /// Current (escalated) rates, applied to the upcoming round.
    transmissibility: f64,
    fatality_probability: f64,
    /// Doses left in the current round.
    vaccine_budget: u32,
    status: OutbreakStatus,
    seed_case: PersonId,
    parameters: Parameters,
}

impl DataPlugin for OutbreakData {
    // Placeholder state; `init_outbreak` replaces the whole container before
    // any other operation can observe it.
    const new: &'static dyn Fn() -> Self = &|| OutbreakData {
        round: 0,
        transmissibility: 0.0,
        fatality_probability: 0.0,
        vaccine_budget: 0,
        status: OutbreakStatus::Continuing,
        seed_case: PersonId(0),
        parameters: Parameters::default(),
    };
}

fn not_initialized() -> OutbreakError {
    OutbreakError::OutbreakError(String::from(
        "no active outbreak; call init_outbreak first",
    ))
}

pub trait ContextOutbreakExt {
    /// Starts a fresh scenario: places `parameters.population` people, wires
    /// a new contact network, and infects one uniformly chosen seed case.
    /// Replaces any previous scenario wholesale. Invalid parameters fail
    /// before any existing state is touched.
    fn init_outbreak(&mut self, parameters: Parameters) -> Result<GraphSnapshot, OutbreakError>;

    /// Spends one dose on `person_id`. Returns `Ok(true)` if the person was
    /// susceptible and a dose was available; `Ok(false)` if the dose could
    /// not be given (wrong status, empty budget, or the scenario already
    /// ended). Unknown ids are an error.
    fn vaccinate(&mut self, person_id: PersonId) -> Result<bool, OutbreakError>;

    /// Resolves one round: transmission over the contact network, then
    /// fatality among those infected when the round began. Afterwards both
    /// rates escalate and the vaccine budget refills. Fails once the
    /// scenario has ended.
    fn advance_round(&mut self) -> Result<RoundReport, OutbreakError>;

    fn get_outbreak_summary(&self) -> Result<OutbreakSummary, OutbreakError>;

    fn get_graph_snapshot(&self) -> Result<GraphSnapshot, OutbreakError>;
}

impl ContextOutbreakExt for Context {
    fn init_outbreak(&mut self, parameters: Parameters) -> Result<GraphSnapshot, OutbreakError> {
        parameters.validate()?;
        debug!(
            "starting outbreak scenario: {} people, seed {}",
            parameters.population, parameters.seed
        );

        self.init_random(parameters.seed);
        *self.get_data_container_mut::<PeopleData>() = PeopleData::default();
        for _ in 0..parameters.population {
            let unit: [f32; 3] = self.sample_distr::<PositionRng, _>(UnitBall);
            self.add_person(Position::from_unit(unit, parameters.position_radius));
        }
        self.generate_contacts(parameters.min_contacts..=parameters.max_contacts);

        let seed_case =
            PersonId(self.sample_range::<SeedCaseRng, _, usize>(0..parameters.population));
        self.set_health_status(seed_case, HealthStatus::Infected);
        debug!("seed case is {seed_case}");

        *self.get_data_container_mut::<OutbreakData>() = OutbreakData {
            round: 1,
            transmissibility: parameters.transmissibility,
            fatality_probability: parameters.fatality_probability,
            vaccine_budget: parameters.vaccines_per_round,
            status: OutbreakStatus::Continuing,
            seed_case,
            parameters,
        };

        self.get_graph_snapshot()
    }

    fn vaccinate(&mut self, person_id: PersonId) -> Result<bool, OutbreakError> {
        let Some(data) = self.get_data_container::<OutbreakData>() else {
            return Err(not_initialized());
        };
        let status = data.status;
        let budget = data.vaccine_budget;

        if person_id.0 >= self.get_current_population() {
            return Err(OutbreakError::OutbreakError(format!(
                "no such person: {person_id}"
            )));
        }
        if status != OutbreakStatus::Continuing {
            trace!("dose refused: scenario already ended");
            return Ok(false);
        }
        if budget == 0 {
            trace!("dose refused: budget exhausted for this round");
            return Ok(false);
        }
        if !self.get_health_status(person_id).is_susceptible() {
            trace!("dose refused: {person_id} is not susceptible");
            return Ok(false);
        }

        self.set_health_status(person_id, HealthStatus::Vaccinated);
        self.get_data_container_mut::<OutbreakData>().vaccine_budget -= 1;
        Ok(true)
    }

    fn advance_round(&mut self) -> Result<RoundReport, OutbreakError> {
        let Some(data) = self.get_data_container::<OutbreakData>() else {
            return Err(not_initialized());
        };
        if data.status != OutbreakStatus::Continuing {
            return Err(OutbreakError::OutbreakError(format!(
                "scenario already ended with status {:?}",
                data.status
            )));
        }
        let round = data.round;
        let transmissibility = data.transmissibility;
        let fatality_probability = data.fatality_probability;

        // Snapshot the state the round starts from. Both phases plan against
        // this snapshot, so this round's new cases neither transmit nor die.
        let infected = self.people_with_status(HealthStatus::Infected);
        let statuses = self
            .get_data_container::<PeopleData>()
            .unwrap() // an active outbreak implies people exist
            .statuses()
            .to_vec();
        let contact_lists: Vec<(PersonId, Vec<PersonId>)> = infected
            .iter()
            .map(|&person| (person, self.get_contacts(person).to_vec()))
            .collect();

        let (transmissions, new_infections) = self.sample::<TransmissionRng, _>(|rng| {
            plan_transmissions(&statuses, &contact_lists, transmissibility, rng)
        });
        let new_deaths = self.sample::<FatalityRng, _>(|rng| {
            plan_fatalities(&infected, fatality_probability, rng)
        });

        // The two outcome sets are disjoint: deaths come from the already
        // infected, new infections from the susceptible.
        for &person in &new_deaths {
            self.set_health_status(person, HealthStatus::Deceased);
        }
        for &person in &new_infections {
            self.set_health_status(person, HealthStatus::Infected);
        }

        let population = self.get_current_population();
        let deceased = self.count_with_status(HealthStatus::Deceased);
        let still_infected = self.count_with_status(HealthStatus::Infected);
        let status = evaluate_status(population, still_infected, deceased);

        let data = self.get_data_container_mut::<OutbreakData>();
        data.round += 1;
        data.transmissibility += data.parameters.transmissibility_growth;
        data.fatality_probability += data.parameters.fatality_growth;
        data.vaccine_budget = data.parameters.vaccines_per_round;
        data.status = status;

        debug!(
            "round {round}: {} new infections, {} deaths, status {status:?}",
            new_infections.len(),
            new_deaths.len()
        );

        Ok(RoundReport {
            round,
            transmissions,
            new_infections,
            new_deaths,
            transmissibility,
            fatality_probability,
            status,
        })
    }

    fn get_outbreak_summary(&self) -> Result<OutbreakSummary, OutbreakError> {
        let Some(data) = self.get_data_container::<OutbreakData>() else {
            return Err(not_initialized());
        };
        Ok(OutbreakSummary {
            population: self.get_current_population(),
            susceptible: self.count_with_status(HealthStatus::Susceptible),
            infected: self.count_with_status(HealthStatus::Infected),
            vaccinated: self.count_with_status(HealthStatus::Vaccinated),
            deceased: self.count_with_status(HealthStatus::Deceased),
            round: data.round,
            vaccine_budget: data.vaccine_budget,
            seed_case: data.seed_case,
            status: data.status,
        })
    }

    fn get_graph_snapshot(&self) -> Result<GraphSnapshot, OutbreakError> {
        if self.get_data_container::<OutbreakData>().is_none() {
            return Err(not_initialized());
        }
        let nodes = (0..self.get_current_population())
            .map(|index| {
                let id = PersonId(index);
                NodeSnapshot {
                    id,
                    position: self.get_position(id),
                    status: self.get_health_status(id),
                }
            })
            .collect();
        Ok(GraphSnapshot {
            nodes,
            edges: self.get_edges().to_vec(),
        })
    }
}

/// Plans this round's transmissions against the start-of-round snapshot.
/// Returns the successful exposures and the distinct people they reach, in
/// encounter order (infectors ascending, each one's contacts in edge order).
fn plan_transmissions(
    statuses: &[HealthStatus],
    contact_lists: &[(PersonId, Vec<PersonId>)],
    transmissibility: f64,
    rng: &mut impl Rng,
) -> (Vec<Transmission>, Vec<PersonId>) {
    let mut transmissions = Vec::new();
    let mut reached: Vec<PersonId> = Vec::new();
    let mut reached_set: HashSet<PersonId> = HashSet::default();

    for (infector, contacts) in contact_lists {
        if contacts.is_empty() {
            // Isolated people expose nobody and consume no draws.
            continue;
        }
        let per_contact = transmissibility / contacts.len() as f64;
        for &contact in contacts {
            if !statuses[contact.0].is_susceptible() || reached_set.contains(&contact) {
                // Skipped before the draw: one draw decides each new case.
                continue;
            }
            if rng.random::<f64>() < per_contact {
                reached_set.insert(contact);
                reached.push(contact);
                transmissions.push(Transmission {
                    from: *infector,
                    to: contact,
                });
            }
        }
    }

    (transmissions, reached)
}

/// Plans this round's deaths among the people infected when it began. One
/// draw per infected person, in ascending id order.
fn plan_fatalities(
    infected: &[PersonId],
    fatality_probability: f64,
    rng: &mut impl Rng,
) -> Vec<PersonId> {
    infected
        .iter()
        .copied()
        .filter(|_| rng.random::<f64>() < fatality_probability)
        .collect()
}

fn evaluate_status(population: usize, infected: usize, deceased: usize) -> OutbreakStatus {
    if deceased == population {
        OutbreakStatus::TotalLoss
    } else if infected == 0 {
        OutbreakStatus::Victory
    } else {
        OutbreakStatus::Continuing
    }
}
