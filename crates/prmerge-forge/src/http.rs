//! Request plumbing shared by both backends.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::types::{ClientOptions, Fetched};

/// Build an HTTP client with the shared defaults plus `accept`.
pub(crate) fn build_client(accept: &'static str, options: &ClientOptions) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers.insert(USER_AGENT, HeaderValue::from_static("prmerge"));

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(options.timeout)
        .build()?)
}

/// Decode a JSON response, turning non-success statuses into [`Fetched::Failed`].
pub(crate) async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<Fetched<T>> {
    let status = response.status();

    if status.is_success() {
        let text = response.text().await?;
        let body = serde_json::from_str(&text).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })?;
        return Ok(Fetched::Data(body));
    }

    let status_code = status.as_u16();
    let rate_limited = status_code == 403
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .is_some_and(|v| v == "0");

    let message = if rate_limited {
        "API rate limit exceeded".to_string()
    } else {
        response.text().await.unwrap_or_default()
    };

    Ok(Fetched::Failed {
        status: status_code,
        message,
    })
}
