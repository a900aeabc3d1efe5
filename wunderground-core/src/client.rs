use std::{future::Future, time::Duration};

use reqwest::{Client, StatusCode, header::ACCEPT};

use crate::{Error, model::Observation};

pub const DEFAULT_BASE_URL: &str = "http://api.wunderground.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Knobs for [`WeatherClient::with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Scheme and host the request path is appended to.
    pub base_url: String,
    /// Request timeout of the default transport. Ignored for a supplied transport.
    pub timeout: Duration,
    /// Skip TLS certificate validation on the default transport.
    pub accept_invalid_certs: bool,
    /// Fail with [`Error::Decode`] when a 200 body is not JSON, instead of
    /// returning an empty observation.
    pub strict_decoding: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
            strict_decoding: false,
        }
    }
}

/// Client for the current conditions of one city.
///
/// Cloning is cheap and clones share the connection pool. A transport passed
/// to [`WeatherClient::new`] must be usable from several tasks at once for
/// concurrent calls to be safe; `reqwest::Client` is.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    url: String,
    strict_decoding: bool,
}

impl WeatherClient {
    /// Create a client with default options. When `http` is `None` a transport
    /// with a 20 second timeout is built.
    pub fn new(
        http: Option<Client>,
        state: &str,
        city: &str,
        api_key: &str,
    ) -> Result<Self, Error> {
        Self::with_options(http, state, city, api_key, &ClientOptions::default())
    }

    pub fn with_options(
        http: Option<Client>,
        state: &str,
        city: &str,
        api_key: &str,
        options: &ClientOptions,
    ) -> Result<Self, Error> {
        let http = match http {
            Some(http) => http,
            None => default_http_client(options)?,
        };

        // State and city go into the path verbatim.
        let base = options.base_url.trim_end_matches('/');
        let url = format!("{base}/api/{api_key}/conditions/q/{state}/{city}.json");

        let redacted = format!("{base}/api/<redacted>/conditions/q/{state}/{city}.json");
        tracing::debug!(url = %redacted, "created weather client");

        Ok(Self { http, url, strict_decoding: options.strict_decoding })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current conditions with a single request.
    ///
    /// A 200 response always succeeds; a body that does not match the
    /// expected shape yields zeroed fields. Any other status becomes
    /// [`Error::Upstream`] carrying the response body.
    pub async fn get_weather(&self) -> Result<Observation, Error> {
        tracing::debug!("requesting current conditions");

        let res = self
            .http
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            // The URL carries the API key.
            .map_err(|err| Error::Transport(err.without_url()))?;

        let status = res.status();
        let body = res.bytes().await.map_err(|err| Error::Body(err.without_url()))?;
        tracing::debug!(%status, len = body.len(), "received response");

        if status != StatusCode::OK {
            let body = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(%status, "upstream returned an error");
            return Err(Error::Upstream { status, body });
        }

        if self.strict_decoding {
            Ok(Observation::from_slice_strict(&body)?)
        } else {
            Ok(Observation::from_slice_lenient(&body))
        }
    }

    /// [`WeatherClient::get_weather`], abandoned with [`Error::Cancelled`] as
    /// soon as `cancel` resolves.
    pub async fn get_weather_until<F>(&self, cancel: F) -> Result<Observation, Error>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            res = self.get_weather() => res,
            () = cancel => {
                tracing::debug!("request cancelled");
                Err(Error::Cancelled)
            }
        }
    }
}

/// Transport used when the caller does not supply one.
pub fn default_http_client(options: &ClientOptions) -> Result<Client, Error> {
    if options.accept_invalid_certs {
        tracing::warn!("TLS certificate validation is disabled");
    }

    Client::builder()
        .timeout(options.timeout)
        .danger_accept_invalid_certs(options.accept_invalid_certs)
        .build()
        .map_err(Error::Build)
}
