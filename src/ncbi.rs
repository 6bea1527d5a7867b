use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::biosample::parse_biosample_xml;
use crate::config::ResolvedConfig;
use crate::domain::{BioSampleId, FetchOutcome};
use crate::error::KiraError;

pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

pub trait BioSampleClient: Send + Sync {
    /// Raw efetch XML for one BioSample.
    fn fetch_xml(&self, id: &BioSampleId) -> Result<String, KiraError>;
}

#[derive(Clone)]
pub struct NcbiHttpClient {
    client: Client,
    base_url: String,
    tool: String,
    email: Option<String>,
    api_key: Option<String>,
}

impl NcbiHttpClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self, KiraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-bsf/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| KiraError::NcbiHttp(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| KiraError::NcbiHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tool: config.tool.clone(),
            email: config.email.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn efetch_url(&self) -> String {
        format!("{}/efetch.fcgi", self.base_url)
    }

    fn query_params<'a>(&'a self, id: &'a BioSampleId) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![
            ("db", "biosample"),
            ("id", id.as_str()),
            ("rettype", "xml"),
            ("tool", self.tool.as_str()),
        ];
        if let Some(email) = &self.email {
            params.push(("email", email.as_str()));
        }
        if let Some(api_key) = &self.api_key {
            params.push(("api_key", api_key.as_str()));
        }
        params
    }
}

impl BioSampleClient for NcbiHttpClient {
    fn fetch_xml(&self, id: &BioSampleId) -> Result<String, KiraError> {
        let start = Instant::now();
        let response = self
            .client
            .get(self.efetch_url())
            .query(&self.query_params(id))
            .send()
            .map_err(|err| KiraError::NcbiHttp(err.to_string()))?;

        let status = response.status();
        tracing::debug!(
            id = %id,
            status = status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "efetch response"
        );
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "NCBI request failed".to_string());
            return Err(KiraError::NcbiStatus {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }
        response
            .text()
            .map_err(|err| KiraError::NcbiHttp(err.to_string()))
    }
}

/// One lookup for `id`. Every failure is folded into the outcome so the
/// caller always gets a row for the identifier.
pub fn fetch_metadata<C: BioSampleClient + ?Sized>(client: &C, id: &BioSampleId) -> FetchOutcome {
    let result = client
        .fetch_xml(id)
        .and_then(|xml| parse_biosample_xml(&xml));
    FetchOutcome::from_result(id, result)
}
