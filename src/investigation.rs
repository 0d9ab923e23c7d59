/*!

The investigation game.

A standalone, data-driven engine for "solve the outbreak" cases: the player
moves between locations, spends a minute budget on actions that yield
evidence, leads, and credibility swings, then names a theory (pathogen,
source, vehicle) and checks it against the case's hidden truth. Unlike the
outbreak engine this game has no randomness at all; a [`Scenario`] fully
determines what every action does, so cases can be authored as JSON.

Rules worth calling out:

 - A gated action (one with `requires`) that is attempted too early costs
   nothing, not even time.
 - Evidence is keyed; re-collecting a key replaces the entry instead of
   double counting its weight.
 - A wrong theory does not end the case; running out of time does.

*/

use serde::{Deserialize, Serialize};

use crate::{error::OutbreakError, hashing::HashMap, trace};

/// Minutes spent moving between locations.
pub const TRAVEL_MINUTES: u32 = 2;

const CREDIBILITY_RANGE: (i32, i32) = (0, 100);

fn default_starting_time() -> u32 {
    8 * 60
}

fn default_starting_credibility() -> i32 {
    50
}

fn default_evidence_goal() -> u32 {
    25
}

fn default_evidence_weight() -> u32 {
    1
}

/// A complete authored case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub starting_location: String,
    #[serde(default = "default_starting_time")]
    pub starting_time: u32,
    #[serde(default = "default_starting_credibility")]
    pub starting_credibility: i32,
    /// Total evidence weight worth a perfect score.
    #[serde(default = "default_evidence_goal")]
    pub evidence_goal: u32,
    /// The hidden answer; all three slots must be filled.
    pub truth: Theory,
    pub locations: HashMap<String, Location>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub label: String,
    /// Minutes this action costs.
    #[serde(default)]
    pub minutes: u32,
    /// Credibility gained (or lost, if negative).
    #[serde(default)]
    pub credibility: i32,
    /// Evidence keys that must already be held.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Location the player is moved to after the action.
    #[serde(default)]
    pub goes_to: Option<String>,
    #[serde(default)]
    pub evidence: Option<Evidence>,
    #[serde(default)]
    pub lead: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub key: String,
    pub label: String,
    /// Contribution toward the scenario's evidence goal.
    #[serde(default = "default_evidence_weight")]
    pub weight: u32,
}

/// The player's (or the case's) answer: what, where from, and how.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Theory {
    pub pathogen: Option<String>,
    pub source: Option<String>,
    pub vehicle: Option<String>,
}

impl Theory {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pathogen.is_some() && self.source.is_some() && self.vehicle.is_some()
    }
}

/// What happened when the player tried an action.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActionOutcome {
    /// Effects were applied; see [`Investigation::message`].
    Applied,
    /// A `requires` gate failed. Nothing was spent.
    MissingEvidence,
    /// The case is already over; nothing happened.
    SessionOver,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TheoryVerdict {
    Correct,
    Incorrect,
    /// At least one theory slot is still empty.
    Incomplete,
    SessionOver,
}

/// A running playthrough of one [`Scenario`].
pub struct Investigation {
    scenario: Scenario,
    location: String,
    time_remaining: u32,
    credibility: i32,
    evidence: Vec<Evidence>,
    leads: Vec<String>,
    visited: Vec<String>,
    message: String,
    theory: Theory,
    solved: bool,
    ended: bool,
}

impl Investigation {
    /// Starts a playthrough, rejecting scenarios with dangling references:
    /// a missing starting location, travel targets or `requires` keys that
    /// exist nowhere, duplicate action ids within a location, or an
    /// incomplete truth.
    pub fn new(scenario: Scenario) -> Result<Self, OutbreakError> {
        validate_scenario(&scenario)?;
        let location = scenario.starting_location.clone();
        let message = scenario.locations[location.as_str()].description.clone();
        let mut investigation = Investigation {
            time_remaining: scenario.starting_time,
            credibility: scenario.starting_credibility,
            evidence: Vec::new(),
            leads: Vec::new(),
            visited: vec![location.clone()],
            message,
            theory: Theory::default(),
            solved: false,
            ended: false,
            location,
            scenario,
        };
        // A case authored with no minutes on the clock is over before it starts.
        investigation.check_clock();
        Ok(investigation)
    }

    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// The id of the player's current location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn current_location(&self) -> &Location {
        // Valid by construction: moves are validated before they happen.
        &self.scenario.locations[self.location.as_str()]
    }

    /// The actions offered where the player currently stands.
    #[must_use]
    pub fn available_actions(&self) -> &[Action] {
        &self.current_location().actions
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn credibility(&self) -> i32 {
        self.credibility
    }

    /// The most recent narration line.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }

    #[must_use]
    pub fn leads(&self) -> &[String] {
        &self.leads
    }

    #[must_use]
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    #[must_use]
    pub fn theory(&self) -> &Theory {
        &self.theory
    }

    #[must_use]
    pub fn solved(&self) -> bool {
        self.solved
    }

    #[must_use]
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Evidence score as a percentage of the scenario's goal, capped at 100.
    #[must_use]
    pub fn score(&self) -> u32 {
        let total: u32 = self.evidence.iter().map(|evidence| evidence.weight).sum();
        let ratio = f64::from(total) / f64::from(self.scenario.evidence_goal.max(1));
        let score = (ratio * 100.0).round();
        if score > 100.0 {
            100
        } else {
            score as u32
        }
    }

    fn holds_evidence(&self, key: &str) -> bool {
        self.evidence.iter().any(|evidence| evidence.key == key)
    }

    fn enter(&mut self, location_id: &str) {
        if !self.visited.iter().any(|visited| visited == location_id) {
            self.visited.push(location_id.to_string());
        }
        self.location = location_id.to_string();
    }

    fn spend_minutes(&mut self, minutes: u32) {
        self.time_remaining = self.time_remaining.saturating_sub(minutes);
    }

    /// Ends the case if the clock hit zero. Runs after an action's effects,
    /// so an action that lands exactly on zero still pays out.
    fn check_clock(&mut self) {
        if self.time_remaining == 0 && !self.solved && !self.ended {
            self.ended = true;
            self.message = String::from("Time has run out before the case was solved.");
        }
    }

    /// Moves to another location for [`TRAVEL_MINUTES`]. Unknown ids are an
    /// error; traveling after the case ended is a quiet no-op.
    pub fn travel(&mut self, location_id: &str) -> Result<ActionOutcome, OutbreakError> {
        let Some(destination) = self.scenario.locations.get(location_id) else {
            return Err(OutbreakError::OutbreakError(format!(
                "no such location: {location_id}"
            )));
        };
        let title = destination.title.clone();
        if self.ended {
            return Ok(ActionOutcome::SessionOver);
        }
        trace!("investigator travels to {location_id}");
        self.message = format!("Traveled to {title}.");
        self.spend_minutes(TRAVEL_MINUTES);
        self.enter(location_id);
        self.check_clock();
        Ok(ActionOutcome::Applied)
    }

    /// Performs one of the current location's actions by id.
    pub fn apply_action(&mut self, action_id: &str) -> Result<ActionOutcome, OutbreakError> {
        let Some(action) = self
            .available_actions()
            .iter()
            .find(|action| action.id == action_id)
            .cloned()
        else {
            return Err(OutbreakError::OutbreakError(format!(
                "no action '{action_id}' at {}",
                self.location
            )));
        };
        if self.ended {
            return Ok(ActionOutcome::SessionOver);
        }
        if !action.requires.iter().all(|key| self.holds_evidence(key)) {
            // The gate fires before any cost is paid.
            self.message = String::from("You don't have what's needed yet.");
            return Ok(ActionOutcome::MissingEvidence);
        }

        trace!("investigator action {action_id}");
        self.spend_minutes(action.minutes);
        self.credibility =
            (self.credibility + action.credibility).clamp(CREDIBILITY_RANGE.0, CREDIBILITY_RANGE.1);
        self.message = action.label.clone();

        if let Some(evidence) = action.evidence {
            self.message = format!("Evidence added: {}", evidence.label);
            match self
                .evidence
                .iter_mut()
                .find(|held| held.key == evidence.key)
            {
                Some(held) => *held = evidence,
                None => self.evidence.push(evidence),
            }
        }
        if let Some(lead) = action.lead {
            if !self.leads.contains(&lead) {
                self.leads.push(lead);
            }
        }
        if let Some(destination) = action.goes_to {
            let title = self.scenario.locations[destination.as_str()].title.clone();
            self.message = format!("Traveled to {title}.");
            self.enter(&destination);
        }

        self.check_clock();
        Ok(ActionOutcome::Applied)
    }

    pub fn set_pathogen(&mut self, value: impl Into<String>) {
        self.theory.pathogen = Some(value.into());
    }

    pub fn set_source(&mut self, value: impl Into<String>) {
        self.theory.source = Some(value.into());
    }

    pub fn set_vehicle(&mut self, value: impl Into<String>) {
        self.theory.vehicle = Some(value.into());
    }

    /// Replaces the whole working theory at once.
    pub fn choose_theory(&mut self, theory: Theory) {
        self.theory = theory;
    }

    /// Starts the case over: the clock, credibility, and location return to
    /// their starting values, and all evidence, leads, and theory picks are
    /// discarded. The scenario itself is untouched.
    pub fn reset(&mut self) {
        let location = self.scenario.starting_location.clone();
        self.message = self.scenario.locations[location.as_str()].description.clone();
        self.time_remaining = self.scenario.starting_time;
        self.credibility = self.scenario.starting_credibility;
        self.evidence.clear();
        self.leads.clear();
        self.visited = vec![location.clone()];
        self.location = location;
        self.theory = Theory::default();
        self.solved = false;
        self.ended = false;
        self.check_clock();
    }

    /// Checks the player's theory against the case truth. A correct theory
    /// solves and ends the case; a wrong one just says so, leaving the
    /// player free to keep investigating.
    pub fn check_theory(&mut self) -> TheoryVerdict {
        if self.ended && !self.solved {
            return TheoryVerdict::SessionOver;
        }
        if !self.theory.is_complete() {
            self.message = String::from("Select a pathogen, source, and vehicle first.");
            return TheoryVerdict::Incomplete;
        }
        if self.theory == self.scenario.truth {
            self.solved = true;
            self.ended = true;
            self.message = String::from("Correct! The case is closed.");
            TheoryVerdict::Correct
        } else {
            self.message = String::from("Not quite. Re-examine your evidence.");
            TheoryVerdict::Incorrect
        }
    }
}

fn validate_scenario(scenario: &Scenario) -> Result<(), OutbreakError> {
    if !scenario.locations.contains_key(scenario.starting_location.as_str()) {
        return Err(OutbreakError::OutbreakError(format!(
            "starting location '{}' does not exist",
            scenario.starting_location
        )));
    }
    if !scenario.truth.is_complete() {
        return Err(OutbreakError::OutbreakError(String::from(
            "case truth must name a pathogen, a source, and a vehicle",
        )));
    }

    let mut known_evidence: Vec<&str> = Vec::new();
    for location in scenario.locations.values() {
        for action in &location.actions {
            if let Some(evidence) = &action.evidence {
                known_evidence.push(&evidence.key);
            }
        }
    }

    for (location_id, location) in &scenario.locations {
        for (index, action) in location.actions.iter().enumerate() {
            if location.actions[..index].iter().any(|other| other.id == action.id) {
                return Err(OutbreakError::OutbreakError(format!(
                    "duplicate action id '{}' at {location_id}",
                    action.id
                )));
            }
            if let Some(destination) = &action.goes_to {
                if !scenario.locations.contains_key(destination.as_str()) {
                    return Err(OutbreakError::OutbreakError(format!(
                        "action '{}' at {location_id} goes to unknown location '{destination}'",
                        action.id
                    )));
                }
            }
            for key in &action.requires {
                if !known_evidence.iter().any(|known| known == key) {
                    return Err(OutbreakError::OutbreakError(format!(
                        "action '{}' at {location_id} requires evidence '{key}' that nothing provides",
                        action.id
                    )));
                }
            }
        }
    }
    Ok(())
}
