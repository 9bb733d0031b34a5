//! Blocking UPnP/SOAP client for the router's WAN interface statistics.
//!
//! FRITZ!Box routers expose the IGD `WANCommonInterfaceConfig` service on
//! port 49000 without authentication. One `GetAddonInfos` action returns the
//! cumulative byte counters and the device's own instantaneous rates.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::source::SampleSource;
use crate::types::RawSample;
use crate::{Error, Result};

const SERVICE_TYPE: &str = "urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1";
const CONTROL_PATH: &str = "/igdupnp/control/WANCommonIFC1";
const ACTION: &str = "GetAddonInfos";

/// Default host name FRITZ!Box routers answer on.
pub const DEFAULT_HOST: &str = "fritz.box";
/// Default UPnP control port.
pub const DEFAULT_PORT: u16 = 49000;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches traffic counters from a router's UPnP control endpoint.
pub struct SoapSource {
    client: Client,
    endpoint: String,
}

impl SoapSource {
    /// Create a source talking to `host:port` with the default timeout.
    ///
    /// # Errors
    /// Returns [`Error::DeviceUnreachable`] if the HTTP client cannot be
    /// constructed.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Self::with_timeout(host, port, DEFAULT_TIMEOUT)
    }

    /// Create a source with an explicit per-request timeout.
    ///
    /// # Errors
    /// Returns [`Error::DeviceUnreachable`] if the HTTP client cannot be
    /// constructed.
    pub fn with_timeout(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("http://{host}:{port}{CONTROL_PATH}"),
        })
    }

    /// The control URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body() -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" "#,
                r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
                "<s:Body><u:{action} xmlns:u=\"{service}\"/></s:Body>",
                "</s:Envelope>"
            ),
            action = ACTION,
            service = SERVICE_TYPE,
        )
    }
}

impl SampleSource for SoapSource {
    fn fetch(&mut self) -> Result<RawSample> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", r#"text/xml; charset="utf-8""#)
            .header("SOAPAction", format!("\"{SERVICE_TYPE}#{ACTION}\""))
            .body(Self::request_body())
            .send()?
            .error_for_status()?;

        let body = response.text()?;
        parse_addon_infos(&body)
    }
}

/// Pull the four counter fields out of a `GetAddonInfos` response body.
///
/// The response is a small fixed-shape SOAP envelope; plain tag extraction
/// keeps the dependency surface at one HTTP client.
fn parse_addon_infos(body: &str) -> Result<RawSample> {
    Ok(RawSample {
        total_received: extract_field(body, "NewTotalBytesReceived")?,
        total_sent: extract_field(body, "NewTotalBytesSent")?,
        recv_rate: extract_field(body, "NewByteReceiveRate")?,
        send_rate: extract_field(body, "NewByteSendRate")?,
    })
}

fn extract_field(body: &str, field: &str) -> Result<u64> {
    let open = format!("<{field}>");
    let close = format!("</{field}>");

    let start = body
        .find(&open)
        .map(|pos| pos + open.len())
        .ok_or_else(|| Error::protocol(field, "missing from response"))?;
    let end = body[start..]
        .find(&close)
        .map(|pos| start + pos)
        .ok_or_else(|| Error::protocol(field, "unterminated element"))?;

    body[start..end]
        .trim()
        .parse::<u64>()
        .map_err(|err| Error::protocol(field, format!("not an unsigned integer: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = concat!(
        r#"<?xml version="1.0"?>"#,
        r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#,
        "<s:Body><u:GetAddonInfosResponse>",
        "<NewByteSendRate>2048</NewByteSendRate>",
        "<NewByteReceiveRate>131072</NewByteReceiveRate>",
        "<NewTotalBytesSent>123456</NewTotalBytesSent>",
        "<NewTotalBytesReceived>987654321</NewTotalBytesReceived>",
        "</u:GetAddonInfosResponse></s:Body></s:Envelope>",
    );

    #[test]
    fn parses_all_counter_fields() {
        let sample = parse_addon_infos(RESPONSE).unwrap();
        assert_eq!(sample.total_received, 987_654_321);
        assert_eq!(sample.total_sent, 123_456);
        assert_eq!(sample.recv_rate, 131_072);
        assert_eq!(sample.send_rate, 2_048);
    }

    #[test]
    fn missing_field_names_the_field() {
        let body = RESPONSE.replace("NewTotalBytesSent", "SomethingElse");
        let err = parse_addon_infos(&body).unwrap_err();
        match err {
            Error::Protocol { field, .. } => assert_eq!(field, "NewTotalBytesSent"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_field_is_a_protocol_error() {
        let body = RESPONSE.replace("123456", "lots");
        let err = parse_addon_infos(&body).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }), "{err}");
    }

    #[test]
    fn request_body_names_the_action_and_service() {
        let body = SoapSource::request_body();
        assert!(body.contains("u:GetAddonInfos"));
        assert!(body.contains(SERVICE_TYPE));
    }

    #[test]
    fn endpoint_uses_the_igd_control_path() {
        let source = SoapSource::new("fritz.box", 49000).unwrap();
        assert_eq!(
            source.endpoint(),
            "http://fritz.box:49000/igdupnp/control/WANCommonIFC1"
        );
    }
}
