use outbreak_core::log::LevelFilter;
use outbreak_core::{
    info, Context, ContextNetworkExt, ContextOutbreakExt, ContextPeopleExt, ContextReportExt,
    HealthStatus, OutbreakError, OutbreakStatus, Parameters,
};

static POPULATION: usize = 60;
static SEED: u64 = 123;
static DIFFICULTY: &str = "normal";

/// Ring vaccination: dose the susceptible contacts of everyone infected
/// until this round's budget runs out.
fn spend_budget(context: &mut Context) -> Result<(), OutbreakError> {
    'dosing: for person in context.people_with_status(HealthStatus::Infected) {
        for contact in context.get_contacts(person).to_vec() {
            if context.get_health_status(contact).is_susceptible() && !context.vaccinate(contact)? {
                break 'dosing;
            }
        }
    }
    Ok(())
}

fn run(context: &mut Context) -> Result<(), OutbreakError> {
    let snapshot =
        context.init_outbreak(Parameters::for_difficulty(POPULATION, SEED, DIFFICULTY))?;
    info!(
        "scenario ready: {} people, {} contact edges",
        snapshot.nodes.len(),
        snapshot.edges.len()
    );

    let report_path = std::env::temp_dir().join("stop-the-infection-rounds.csv");
    context.init_round_report(&report_path)?;

    loop {
        spend_budget(context)?;
        let report = context.advance_round()?;
        context.record_round(&report)?;
        info!(
            "round {}: {} new cases, {} deaths",
            report.round,
            report.new_infections.len(),
            report.new_deaths.len()
        );
        if report.status != OutbreakStatus::Continuing {
            break;
        }
    }
    context.flush_round_report()?;

    let summary = context.get_outbreak_summary()?;
    info!(
        "{:?} after {} rounds: {} vaccinated, {} deceased, {} never touched",
        summary.status,
        summary.round - 1,
        summary.vaccinated,
        summary.deceased,
        summary.susceptible
    );
    info!("round history written to {}", report_path.display());
    Ok(())
}

fn main() {
    outbreak_core::log::enable_logging(LevelFilter::Info);
    let mut context = Context::new();
    run(&mut context).expect("scenario failed");
}
