use clap::Parser;
use octofhir_client::ServerPreset;
use octofhir_cohort::DEFAULT_MAX_COUNT;

#[derive(Parser, Debug)]
#[command(name = "octofhir-cohort")]
#[command(about = "Find patients on a FHIR server, optionally only those with encounters")]
#[command(version)]
pub struct Cli {
    /// Named server (PublicVonk, PublicHapi, Local)
    #[arg(
        short,
        long,
        env = "OCTOFHIR_COHORT_SERVER",
        default_value_t = ServerPreset::default()
    )]
    pub server: ServerPreset,

    /// Server base URL (overrides --server)
    #[arg(short, long, env = "OCTOFHIR_COHORT_URL")]
    pub url: Option<String>,

    /// Patient search criteria as key=value pairs (e.g. -c name=Smith -c gender=female)
    #[arg(short, long = "criteria", value_name = "KEY=VALUE")]
    pub criteria: Vec<String>,

    /// Maximum number of patients to collect
    #[arg(short, long, default_value_t = DEFAULT_MAX_COUNT)]
    pub max: usize,

    /// Only keep patients that have at least one encounter
    #[arg(long)]
    pub only_with_encounters: bool,

    /// Create a sample patient before searching
    #[arg(long)]
    pub create_sample: bool,

    /// Keep the sample patient instead of deleting it after the search
    #[arg(long, requires = "create_sample")]
    pub keep_sample: bool,

    /// Bearer token sent with every request
    #[arg(long, env = "OCTOFHIR_COHORT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for HTTP Basic auth
    #[arg(long, env = "OCTOFHIR_COHORT_USER", conflicts_with = "token")]
    pub user: Option<String>,

    /// Password for HTTP Basic auth
    #[arg(long, env = "OCTOFHIR_COHORT_PASSWORD", hide_env_values = true, requires = "user")]
    pub password: Option<String>,

    /// Page size requested from the server (_count)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "OCTOFHIR_COHORT_LOG", default_value = "warn")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_use_defaults() {
        let cli = Cli::try_parse_from(["octofhir-cohort"]).unwrap();
        assert_eq!(cli.server, ServerPreset::PublicVonk);
        assert_eq!(cli.max, 20);
        assert!(!cli.only_with_encounters);
        assert!(!cli.create_sample);
        assert!(cli.criteria.is_empty());
    }

    #[test]
    fn parses_search_options() {
        let cli = Cli::try_parse_from([
            "octofhir-cohort",
            "--server",
            "public-hapi",
            "-c",
            "name=test",
            "-c",
            "gender=male",
            "--max",
            "5",
            "--only-with-encounters",
        ])
        .unwrap();
        assert_eq!(cli.server, ServerPreset::PublicHapi);
        assert_eq!(cli.criteria, ["name=test", "gender=male"]);
        assert_eq!(cli.max, 5);
        assert!(cli.only_with_encounters);
    }

    #[test]
    fn keep_sample_requires_create_sample() {
        assert!(Cli::try_parse_from(["octofhir-cohort", "--keep-sample"]).is_err());
        assert!(Cli::try_parse_from(["octofhir-cohort", "--create-sample", "--keep-sample"]).is_ok());
    }

    #[test]
    fn basic_auth_conflicts_with_token() {
        assert!(
            Cli::try_parse_from(["octofhir-cohort", "--user", "u", "--token", "t"]).is_err()
        );
        assert!(Cli::try_parse_from(["octofhir-cohort", "--password", "p"]).is_err());
    }

    #[test]
    fn rejects_unknown_preset() {
        assert!(Cli::try_parse_from(["octofhir-cohort", "--server", "mars"]).is_err());
    }
}
