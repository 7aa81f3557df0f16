//! Connection settings for the HTTP client.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use octofhir_cohort::{CohortError, Result};
use url::Url;

/// Well-known FHIR servers the cohort tool can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerPreset {
    #[default]
    PublicVonk,
    PublicHapi,
    Local,
}

impl ServerPreset {
    pub const ALL: [Self; 3] = [Self::PublicVonk, Self::PublicHapi, Self::Local];

    pub fn base_url(self) -> &'static str {
        match self {
            Self::PublicVonk => "http://vonk.fire.ly",
            Self::PublicHapi => "http://hapi.fhir.org/baseR4",
            Self::Local => "http://localhost:8080/fhir",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PublicVonk => "PublicVonk",
            Self::PublicHapi => "PublicHapi",
            Self::Local => "Local",
        }
    }
}

impl fmt::Display for ServerPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServerPreset {
    type Err = CohortError;

    /// Accepts `PublicVonk` as well as `public-vonk`, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                CohortError::validation(format!(
                    "Unknown server preset \"{s}\". Valid presets: {}",
                    names.join(", ")
                ))
            })
    }
}

/// What the server should send back after a create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferReturn {
    Minimal,
    #[default]
    Representation,
    OperationOutcome,
}

impl PreferReturn {
    /// Value of the `Prefer` request header.
    pub fn header_value(self) -> &'static str {
        match self {
            Self::Minimal => "return=minimal",
            Self::Representation => "return=representation",
            Self::OperationOutcome => "return=OperationOutcome",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthHeader {
    Basic { username: String, password: String },
    Bearer { token: String },
}

/// Everything needed to talk to one FHIR server.
///
/// Built once by the caller and handed to
/// [`HttpResourceClient::new`](crate::HttpResourceClient::new).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    pub prefer: PreferReturn,
    pub auth: Option<AuthHeader>,
    pub timeout: Option<Duration>,
    /// Sent as `_count` on searches that do not set it themselves.
    pub page_size: Option<u32>,
}

impl ClientConfig {
    /// Creates a config for the given server base URL.
    ///
    /// # Errors
    ///
    /// Returns `CohortError::Validation` for a URL that cannot be parsed or is
    /// not http(s).
    pub fn new(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(&format!("{trimmed}/"))
            .map_err(|e| CohortError::validation(format!("Invalid server URL \"{base_url}\": {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(CohortError::validation(format!(
                "Unsupported URL scheme \"{}\"; expected http or https",
                base_url.scheme()
            )));
        }
        Ok(Self {
            base_url,
            prefer: PreferReturn::default(),
            auth: None,
            timeout: None,
            page_size: None,
        })
    }

    pub fn from_preset(preset: ServerPreset) -> Result<Self> {
        Self::new(preset.base_url())
    }

    /// Base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn with_prefer(mut self, prefer: PreferReturn) -> Self {
        self.prefer = prefer;
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthHeader) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Resolves a path or absolute URL against the base URL.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CohortError::validation(format!("Invalid URL \"{path}\": {e}")))
    }
}
