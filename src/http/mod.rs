use crate::config::Config;
use crate::rms::RmsQuery;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

// The ORC service prefixes its JSON with a UTF-8 byte order mark.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetching orc data failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("orc api responded {status} ({code}): {body}")]
    Status {
        status: StatusCode,
        code: &'static str,
        body: String,
    },
    #[error("parsing orc data failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid user agent {0:?}")]
    UserAgent(String),
}

pub fn build_client(cfg: &Config) -> Result<Client, FetchError> {
    let user_agent = HeaderValue::from_str(&cfg.user_agent)
        .map_err(|_| FetchError::UserAgent(cfg.user_agent.clone()))?;
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, user_agent);
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let mut builder = Client::builder()
        .default_headers(default_headers)
        .use_rustls_tls();
    if let Some(secs) = cfg.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

pub fn status_code_label(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad_request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::TOO_MANY_REQUESTS => "rate_limited",
        s if s.is_server_error() => "upstream_error",
        _ => "server_error",
    }
}

pub fn strip_bom(body: &[u8]) -> &[u8] {
    body.strip_prefix(UTF8_BOM).unwrap_or(body)
}

/// Run the DownBoatRMS action and decode the response body as JSON.
///
/// The whole body is read (and the response dropped) before decoding starts.
pub async fn download_boat_rms(
    client: &Client,
    cfg: &Config,
    query: &RmsQuery,
) -> Result<Value, FetchError> {
    info!("Downloading boat RMS for {}", query);
    let res = client
        .get(cfg.api_url.clone())
        .query(&query.params())
        .send()
        .await?;

    let status = res.status();
    debug!("GET {} -> {}", res.url(), status);
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status,
            code: status_code_label(status),
            body,
        });
    }

    let raw = res.bytes().await?;
    debug!("Received {} bytes", raw.len());
    let body = strip_bom(&raw);
    if body.len() != raw.len() {
        debug!("Stripped UTF-8 BOM from response");
    }
    let doc = serde_json::from_slice(body)?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rms::CertFamily;

    fn test_config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn default_request_url() {
        let cfg = test_config();
        let client = build_client(&cfg).unwrap();
        let req = client
            .get(cfg.api_url.clone())
            .query(&RmsQuery::default().params())
            .build()
            .unwrap();
        assert_eq!(
            req.url().as_str(),
            "https://data.orc.org/public/WPub.dll?action=DownBoatRMS&SailNo=GRE-016&Family=DH&ext=json"
        );
    }

    #[test]
    fn sail_no_is_form_encoded() {
        let cfg = test_config();
        let client = build_client(&cfg).unwrap();
        let query = RmsQuery::BySailNo {
            sail_no: "ITA 123".into(),
            family: CertFamily::Ns,
        };
        let req = client
            .get(cfg.api_url.clone())
            .query(&query.params())
            .build()
            .unwrap();
        assert_eq!(
            req.url().query(),
            Some("action=DownBoatRMS&SailNo=ITA+123&Family=NS&ext=json")
        );
    }

    #[test]
    fn ref_no_request_url() {
        let cfg = test_config();
        let client = build_client(&cfg).unwrap();
        let query = RmsQuery::ByRefNo {
            ref_no: "0341000ABCD".into(),
        };
        let req = client
            .get(cfg.api_url.clone())
            .query(&query.params())
            .build()
            .unwrap();
        assert_eq!(
            req.url().query(),
            Some("action=DownBoatRMS&RefNo=0341000ABCD&ext=json")
        );
    }

    #[test]
    fn bad_user_agent_is_rejected() {
        let mut cfg = test_config();
        cfg.user_agent = "bad\nagent".into();
        assert!(matches!(build_client(&cfg), Err(FetchError::UserAgent(_))));
    }

    #[test]
    fn status_label_matrix() {
        assert_eq!(status_code_label(StatusCode::BAD_REQUEST), "bad_request");
        assert_eq!(status_code_label(StatusCode::UNAUTHORIZED), "unauthorized");
        assert_eq!(status_code_label(StatusCode::FORBIDDEN), "forbidden");
        assert_eq!(status_code_label(StatusCode::NOT_FOUND), "not_found");
        assert_eq!(
            status_code_label(StatusCode::TOO_MANY_REQUESTS),
            "rate_limited"
        );
        assert_eq!(
            status_code_label(StatusCode::BAD_GATEWAY),
            "upstream_error"
        );
        assert_eq!(status_code_label(StatusCode::IM_A_TEAPOT), "server_error");
    }

    #[test]
    fn bom_is_stripped_once() {
        assert_eq!(strip_bom(b"\xef\xbb\xbf{}"), b"{}");
        assert_eq!(strip_bom(b"{}"), b"{}");
        assert_eq!(strip_bom(b"\xef\xbb\xbf\xef\xbb\xbf[]"), b"\xef\xbb\xbf[]");
    }
}
