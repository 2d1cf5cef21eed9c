use std::time::Duration;

use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

pub struct HttpClient {
    pub client: ClientWithMiddleware,
}

impl HttpClient {
    /// Builds a client that retries transient failures up to `max_retries`
    /// times. Zero leaves retrying to the caller.
    pub fn new(max_retries: u32) -> reqwest::Result<HttpClient> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(30))
            .build()?;

        let client = reqwest_middleware::ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(HttpClient { client })
    }
}

/// Renders a duration the way a person would say it, e.g. "2 minutes".
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    let (value, unit) = if secs < 60 {
        (secs, "second")
    } else if secs < 3600 {
        ((secs + 30) / 60, "minute")
    } else if secs < 86400 {
        ((secs + 1800) / 3600, "hour")
    } else {
        ((secs + 43200) / 86400, "day")
    };

    if value == 1 {
        let article = if unit == "hour" { "an" } else { "a" };
        format!("{} {}", article, unit)
    } else {
        format!("{} {}s", value, unit)
    }
}
