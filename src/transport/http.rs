//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

/// Default [`HttpTransport`] backed by `reqwest`'s blocking client.
///
/// A fresh `reqwest::blocking::Client` is built per call so the per-request `timeout` can vary; the core only ever
/// has one request in flight per [`Context`](crate::Context), so this isn't on a hot path.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestHttpTransport;

impl HttpTransport for ReqwestHttpTransport
{
    fn post_json(&self, url: &str, body: &str, timeout: Duration) -> Result<String, HttpTransportError>
    {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| HttpTransportError::Other(err.to_string()))?;

        let response = client.post(url)
            .header("Content-Type", "application/json")
            .body(body.to_owned())
            .send();

        let response = match response
        {
            Ok(response) => response,
            Err(err) if err.is_timeout() => return Err(HttpTransportError::TimedOut),
            Err(err) => return Err(HttpTransportError::Other(err.to_string())),
        };

        response.text().map_err(|err| HttpTransportError::Other(err.to_string()))
    }
}

//-------------------------------------------------------------------------------------------------------------------
