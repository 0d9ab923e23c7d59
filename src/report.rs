/*!

Round-by-round CSV reporting.

An optional sink for scenario history: once a report file is attached with
[`ContextReportExt::init_round_report`], each recorded round appends one row
combining the round's events with the census after them. The file is plain
CSV with a header row, ready for a spreadsheet or a plotting script.

*/

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::{
    context::{Context, DataPlugin},
    error::OutbreakError,
    outbreak::{ContextOutbreakExt, RoundReport},
    trace,
};

/// One CSV row: what a round did, and where that left the population.
#[derive(Serialize)]
struct RoundRow {
    round: u32,
    new_infections: usize,
    new_deaths: usize,
    susceptible: usize,
    infected: usize,
    vaccinated: usize,
    deceased: usize,
    transmissibility: f64,
    fatality_probability: f64,
    status: String,
}

#[derive(Default)]
pub(crate) struct ReportData {
    writer: Option<csv::Writer<File>>,
}

impl DataPlugin for ReportData {
    const new: &'static dyn Fn() -> Self = &ReportData::default;
}

pub trait ContextReportExt {
    /// Opens (or truncates) `path` as the round report for this context.
    fn init_round_report<P: AsRef<Path>>(&mut self, path: P) -> Result<(), OutbreakError>;

    /// Appends one row for `report`. Must be called while the scenario that
    /// produced the report is still current, since the census columns read
    /// the live state. Fails if no report file is attached.
    fn record_round(&mut self, report: &RoundReport) -> Result<(), OutbreakError>;

    /// Flushes buffered rows to disk.
    fn flush_round_report(&mut self) -> Result<(), OutbreakError>;
}

impl ContextReportExt for Context {
    fn init_round_report<P: AsRef<Path>>(&mut self, path: P) -> Result<(), OutbreakError> {
        trace!("attaching round report at {}", path.as_ref().display());
        let writer = csv::Writer::from_path(path)?;
        self.get_data_container_mut::<ReportData>().writer = Some(writer);
        Ok(())
    }

    fn record_round(&mut self, report: &RoundReport) -> Result<(), OutbreakError> {
        let summary = self.get_outbreak_summary()?;
        let row = RoundRow {
            round: report.round,
            new_infections: report.new_infections.len(),
            new_deaths: report.new_deaths.len(),
            susceptible: summary.susceptible,
            infected: summary.infected,
            vaccinated: summary.vaccinated,
            deceased: summary.deceased,
            transmissibility: report.transmissibility,
            fatality_probability: report.fatality_probability,
            status: format!("{:?}", report.status),
        };

        let Some(writer) = self.get_data_container_mut::<ReportData>().writer.as_mut() else {
            return Err(OutbreakError::OutbreakError(String::from(
                "no round report attached; call init_round_report first",
            )));
        };
        writer.serialize(&row)?;
        Ok(())
    }

    fn flush_round_report(&mut self) -> Result<(), OutbreakError> {
        let Some(writer) = self.get_data_container_mut::<ReportData>().writer.as_mut() else {
            return Err(OutbreakError::OutbreakError(String::from(
                "no round report attached; call init_round_report first",
            )));
        };
        writer.flush()?;
        Ok(())
    }
}
