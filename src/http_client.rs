use std::net::IpAddr;
use std::time::Duration;

use reqwest::{ClientBuilder, Url};

use crate::error::GatewayError;

fn has_proxy_env() -> bool {
    [
        "HTTPS_PROXY",
        "https_proxy",
        "HTTP_PROXY",
        "http_proxy",
        "ALL_PROXY",
        "all_proxy",
    ]
    .iter()
    .any(|k| std::env::var(k).is_ok_and(|v| !v.trim().is_empty()))
}

fn is_loopback_host(host: &str) -> bool {
    let h = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = h.parse::<IpAddr>() {
        return ip.is_loopback();
    }
    let h = h.trim_end_matches('.').to_ascii_lowercase();
    h == "localhost" || h.ends_with(".localhost")
}

fn should_bypass_proxy_impl(url: &str, proxy_env_present: bool) -> bool {
    if !proxy_env_present {
        return false;
    }

    let Ok(u) = Url::parse(url) else {
        return false;
    };
    let Some(host) = u.host_str() else {
        return false;
    };

    is_loopback_host(host)
}

pub fn should_bypass_proxy_for_url(url: &str) -> bool {
    should_bypass_proxy_impl(url, has_proxy_env())
}

pub fn maybe_disable_proxy(builder: ClientBuilder, url: &str) -> ClientBuilder {
    if should_bypass_proxy_for_url(url) {
        builder.no_proxy()
    } else {
        builder
    }
}

pub fn client_for_url_with_timeout(
    url: &str,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    let builder = reqwest::Client::builder().timeout(timeout);
    maybe_disable_proxy(builder, url).build()
}

/// Checks the configured backend base URL: http/https only, a host, no credentials.
/// A trailing slash is dropped so paths can be appended verbatim.
pub fn validate_base_url(raw: &str) -> Result<String, GatewayError> {
    let url = Url::parse(raw.trim())
        .map_err(|_| GatewayError::Config(format!("backend base_url is not a valid URL: {}", raw)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(GatewayError::Config(format!(
                "backend base_url must use http or https, got {}",
                other
            )));
        }
    }

    if url.host_str().is_none() {
        return Err(GatewayError::Config("backend base_url has no host".into()));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(GatewayError::Config(
            "backend base_url must not embed credentials".into(),
        ));
    }

    Ok(raw.trim().trim_end_matches('/').to_string())
}
