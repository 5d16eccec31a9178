//local shortcuts

//third-party shortcuts
use serde_json::Value;

//standard shortcuts
use std::collections::BTreeMap;

//-------------------------------------------------------------------------------------------------------------------

/// Short tag identifying this library to the RTT registration handshake, mirrored into the CONNECT payload's
/// `system.platform` field. The original clients use per-platform tags (`ios`, `android`, `html5`, ...); this one
/// marks an S2S peer written in Rust.
pub(crate) const RTT_PLATFORM: &str = "rust-s2s";

//-------------------------------------------------------------------------------------------------------------------

/// One candidate event-server endpoint, as returned by a `REQUEST_SYSTEM_CONNECTION` response.
#[derive(Debug, Clone)]
pub(crate) struct RttEndpoint
{
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) protocol: String,
    pub(crate) ssl: bool,
}

//-------------------------------------------------------------------------------------------------------------------

/// Parses `data.endpoints` into a list of candidates. Entries missing `host`/`protocol` are skipped rather than
/// failing the whole parse.
pub(crate) fn parse_endpoints(data: &Value) -> Vec<RttEndpoint>
{
    let Some(endpoints) = data.get("endpoints").and_then(Value::as_array) else { return Vec::new(); };

    endpoints.iter()
        .filter_map(|entry| {
            let host = entry.get("host").and_then(Value::as_str)?.to_owned();
            let protocol = entry.get("protocol").and_then(Value::as_str)?.to_owned();
            let port = entry.get("port").and_then(Value::as_u64).unwrap_or(0) as u16;
            let ssl = entry.get("ssl").and_then(Value::as_bool).unwrap_or(false);
            Some(RttEndpoint{ host, port, protocol, ssl })
        })
        .collect()
}

/// Parses `data.auth` into a sorted map, so callers get deterministic query/header ordering.
pub(crate) fn parse_auth(data: &Value) -> BTreeMap<String, String>
{
    let Some(auth) = data.get("auth").and_then(Value::as_object) else { return BTreeMap::new(); };

    auth.iter()
        .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_owned())))
        .collect()
}

/// Picks the preferred endpoint from a candidate list, per the selection rules in the RTT handshake: SSL-capable
/// WebSocket first when `use_websocket`, otherwise plain-TCP first (SSL-TCP is accepted as a fallback but not
/// actively preferred, matching the original).
pub(crate) fn choose_endpoint(endpoints: &[RttEndpoint], use_websocket: bool) -> Option<&RttEndpoint>
{
    if use_websocket
    {
        endpoints.iter().find(|e| e.protocol == "ws" && e.ssl)
            .or_else(|| endpoints.iter().find(|e| e.protocol == "ws"))
    }
    else
    {
        endpoints.iter().find(|e| e.protocol == "tcp" && !e.ssl)
            .or_else(|| endpoints.iter().find(|e| e.protocol == "tcp" && e.ssl))
    }
}

/// Composes the WebSocket URL and handshake headers for `endpoint`, duplicating `auth` in both places per the
/// server's acceptance rules (see the RTT channel's endpoint URL composition notes).
pub(crate) fn build_ws_url(endpoint: &RttEndpoint, auth: &BTreeMap<String, String>) -> (String, Vec<(String, String)>)
{
    let mut url = url::Url::parse("https://example.net").expect("static URL always parses");
    let _ = url.set_scheme(if endpoint.ssl { "wss" } else { "ws" });
    let _ = url.set_host(Some(&endpoint.host));
    if endpoint.port > 0
    {
        let _ = url.set_port(Some(endpoint.port));
    }
    url.query_pairs_mut().extend_pairs(auth.iter());

    let headers = auth.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    (url.to_string(), headers)
}

//-------------------------------------------------------------------------------------------------------------------


//-------------------------------------------------------------------------------------------------------------------
