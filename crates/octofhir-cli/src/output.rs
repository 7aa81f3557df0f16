use std::io::{self, Write};

use colored::Colorize;
use octofhir_cohort::{BundleEntry, EnrichmentDecision, Patient, ResultPage, SearchObserver};
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Prints search progress as it happens.
pub struct ConsoleObserver<W> {
    out: W,
}

impl ConsoleObserver<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> SearchObserver for ConsoleObserver<W> {
    fn page_fetched(&mut self, _page_number: usize, page: &ResultPage) {
        let total = page
            .total
            .map_or_else(|| "unknown".to_string(), |t| t.to_string());
        let _ = writeln!(
            self.out,
            "{} {} {} {}",
            "Patient Bundle.Total:".cyan(),
            total,
            "Entry count:".cyan(),
            page.len()
        );
    }

    fn patient_accepted(
        &mut self,
        position: usize,
        entry: &BundleEntry,
        patient: &Patient,
        decision: &EnrichmentDecision,
    ) {
        let _ = writeln!(
            self.out,
            "- Entry {position:>3}: {}",
            entry.full_url.as_deref().unwrap_or("-")
        );
        let _ = writeln!(self.out, " -   Id: {:>20}", patient.id().unwrap_or("-"));
        if let Some(name) = patient.display_name() {
            let _ = writeln!(self.out, "  - Name:  {name}");
        }
        if decision.encounter_total > 0 {
            let _ = writeln!(
                self.out,
                " - Encounter total: {} Entry count: {}",
                decision.encounter_total, decision.encounter_entries
            );
        }
    }
}

pub fn patients_table(patients: &[Patient]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Birth date"]);
    for patient in patients {
        builder.push_record([
            patient.id().unwrap_or("-").to_string(),
            patient.display_name().unwrap_or_else(|| "-".to_string()),
            patient.birth_date.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn print_patients(patients: &[Patient]) {
    print_success(&format!("Found {} patient(s)", patients.len()));
    if !patients.is_empty() {
        println!("{}", patients_table(patients));
    }
}
