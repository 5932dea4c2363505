use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const FLOW_ENDPOINT: &str = "/api/flow";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error! Status: {status} ({url})")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the raw flow payload comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowSource {
    /// Base URL of the document/search service exposing `GET /api/flow`.
    Server(String),
    File(PathBuf),
}

impl FlowSource {
    pub fn flow_url(base: &str) -> String {
        format!("{}{FLOW_ENDPOINT}", base.trim_end_matches('/'))
    }

    pub(super) fn fetch(&self) -> Result<String, FetchError> {
        match self {
            Self::Server(base) => {
                let url = Self::flow_url(base);
                let transport = |source| FetchError::Transport {
                    url: url.clone(),
                    source,
                };

                let client = reqwest::blocking::Client::builder()
                    .timeout(REQUEST_TIMEOUT)
                    .build()
                    .map_err(transport)?;
                let response = client.get(&url).send().map_err(transport)?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: url.clone(),
                        status,
                    });
                }

                response.text().map_err(transport)
            }
            Self::File(path) => std::fs::read_to_string(path).map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

impl fmt::Display for FlowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(base) => f.write_str(&Self::flow_url(base)),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_url_joins_base_and_endpoint() {
        assert_eq!(
            FlowSource::flow_url("http://127.0.0.1:8000"),
            "http://127.0.0.1:8000/api/flow"
        );
        assert_eq!(
            FlowSource::flow_url("http://docs.internal/"),
            "http://docs.internal/api/flow"
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let source = FlowSource::File(PathBuf::from("/definitely/not/here/flow.json"));
        assert!(matches!(source.fetch(), Err(FetchError::Io { .. })));
    }

    #[test]
    fn display_names_the_location() {
        let source = FlowSource::Server("http://localhost:8000".to_owned());
        assert_eq!(source.to_string(), "http://localhost:8000/api/flow");
    }
}
