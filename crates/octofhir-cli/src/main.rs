mod cli;
mod observability;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use octofhir_client::{AuthHeader, ClientConfig, HttpResourceClient};
use octofhir_cohort::{
    NewPatient, Patient, PatientLifecycle, ResourceClient, SearchCriteria, SearchObserver,
    SearchOptions, find_patients,
};
use time::macros::date;

use cli::Cli;
use output::{ConsoleObserver, print_error, print_patients, print_success};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    let criteria = SearchCriteria::parse(&cli.criteria)?;
    let options = SearchOptions::default()
        .with_max_count(cli.max)
        .with_only_with_encounters(cli.only_with_encounters);
    let sample = cli.create_sample.then(sample_patient);

    let config = client_config(&cli)?;
    println!("{}: {}", "Server".cyan(), config.base_url());
    let client = HttpResourceClient::new(config)?;

    let patients = run_cohort(
        &client,
        &criteria,
        &options,
        sample.as_ref(),
        cli.keep_sample,
        &mut ConsoleObserver::stdout(),
    )
    .await?;
    print_patients(&patients);

    Ok(())
}

/// Runs the patient search, bracketed by the optional sample patient.
///
/// The sample is deleted after the search whether or not the search
/// succeeded, unless `keep_sample` is set.
async fn run_cohort<C>(
    client: &C,
    criteria: &SearchCriteria,
    options: &SearchOptions,
    sample: Option<&NewPatient>,
    keep_sample: bool,
    observer: &mut dyn SearchObserver,
) -> Result<Vec<Patient>>
where
    C: ResourceClient + ?Sized,
{
    let lifecycle = PatientLifecycle::new(client);

    let created = match sample {
        Some(new) => {
            let created = lifecycle
                .create(new)
                .await
                .context("Failed to create sample patient")?;
            tracing::info!(id = created.id().unwrap_or("-"), "sample patient created");
            print_success(&format!(
                "Created Patient/{}",
                created.id().unwrap_or("?").cyan()
            ));
            Some(created)
        }
        None => None,
    };

    let result = find_patients(client, criteria, options, observer)
        .await
        .context("Patient search failed");

    let Some(created) = created else {
        return result;
    };
    let id = created.id().unwrap_or("?");
    if keep_sample {
        tracing::info!(id, "keeping sample patient");
        return result;
    }
    match (lifecycle.delete_patient(&created).await, &result) {
        (Ok(()), Ok(_)) => {
            tracing::info!(id, "sample patient deleted");
            print_success(&format!("Deleted Patient/{}", id.cyan()));
        }
        (Ok(()), Err(_)) => {
            tracing::info!(id, "sample patient deleted after failed search");
        }
        (Err(e), Ok(_)) => {
            return Err(e).context("Failed to delete sample patient");
        }
        (Err(e), Err(_)) => {
            tracing::warn!(id, error = %e, "sample patient left on server");
        }
    }

    result
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.url {
        Some(url) => ClientConfig::new(url)?,
        None => ClientConfig::from_preset(cli.server)?,
    };
    if let Some(token) = &cli.token {
        config = config.with_auth(AuthHeader::Bearer {
            token: token.clone(),
        });
    } else if let Some(username) = &cli.user {
        config = config.with_auth(AuthHeader::Basic {
            username: username.clone(),
            password: cli.password.clone().unwrap_or_default(),
        });
    }
    if let Some(page_size) = cli.page_size {
        config = config.with_page_size(page_size);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

fn sample_patient() -> NewPatient {
    NewPatient::new("Sample", vec!["Cohort".to_string()], date!(1970 - 01 - 01))
}
