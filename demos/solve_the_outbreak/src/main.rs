use outbreak_core::investigation::{Investigation, Scenario, TheoryVerdict};
use outbreak_core::log::LevelFilter;
use outbreak_core::{info, warn, OutbreakError};

static CASE_FILE: &str = include_str!("../case.json");

fn play() -> Result<(), OutbreakError> {
    let scenario: Scenario = serde_json::from_str(CASE_FILE)?;
    let mut game = Investigation::new(scenario)?;
    info!("case loaded: {} locations to canvass", game.scenario().locations.len());
    info!("{}", game.message());

    // Follow the case's own leads: epi curve, patients, lab, then the deli.
    let itinerary: &[(&str, &str)] = &[
        ("briefing", "review_surveillance"),
        ("county_hospital", "interview_patients"),
        ("county_hospital", "collect_samples"),
        ("state_lab", "culture_samples"),
        ("riverside_market", "trace_invoices"),
        ("picnic_grounds", "inspect_coolers"),
    ];
    for (location, action) in itinerary {
        if game.location() != *location {
            game.travel(location)?;
            info!("{}", game.message());
        }
        game.apply_action(action)?;
        info!("{} ({} min left)", game.message(), game.time_remaining());
    }
    for lead in game.leads() {
        info!("lead: {lead}");
    }

    game.set_pathogen("salmonella");
    game.set_source("riverside_market");
    game.set_vehicle("potato_salad"); // a deliberate first miss
    if game.check_theory() == TheoryVerdict::Incorrect {
        warn!("{}", game.message());
        game.set_vehicle("egg_salad");
    }
    match game.check_theory() {
        TheoryVerdict::Correct => info!(
            "{} Evidence score {}, credibility {}, {} minutes to spare.",
            game.message(),
            game.score(),
            game.credibility(),
            game.time_remaining()
        ),
        verdict => warn!("case closed without a solve: {verdict:?}"),
    }
    Ok(())
}

fn main() {
    outbreak_core::log::enable_logging(LevelFilter::Info);
    play().expect("case playthrough failed");
}
