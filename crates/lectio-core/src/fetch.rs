//! Rate-limited HTTP fetch with bounded retries and exponential backoff.
//!
//! Uses async reqwest on a shared runtime internally with
//! tokio::time::timeout for the per-request deadline, but presents a sync
//! interface: the caller suspends only inside the rate limiter and during
//! backoff sleeps.

use std::sync::LazyLock;
use std::time::Duration;

use crate::error::FetchError;
use crate::limiter::RateLimiter;

/// Connect timeout for the shared client
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Fetch tuning knobs, supplied by configuration.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Backoff before retrying: `base * 2^exponent`.
pub fn backoff_delay(base: Duration, exponent: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(exponent))
}

/// HTTP fetcher that paces every attempt through a rate limiter and
/// retries transient failures with exponential backoff.
#[derive(Debug)]
pub struct Fetcher {
    limiter: RateLimiter,
    opts: FetchOptions,
}

impl Fetcher {
    pub fn new(limiter: RateLimiter, opts: FetchOptions) -> Self {
        Self { limiter, opts }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.opts
    }

    /// Perform one logical fetch of `url`, returning the response body.
    ///
    /// 404 propagates immediately as [`FetchError::NotFound`]. 429 backs
    /// off one doubling harder than 5xx/transport failures. Retries stop
    /// after `max_retries` additional attempts; the last error is returned.
    pub fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0u32;
        loop {
            self.limiter.acquire();
            match self.attempt(url) {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.opts.max_retries => {
                    let exponent = if e.is_rate_limited() {
                        attempt + 1
                    } else {
                        attempt
                    };
                    let delay = backoff_delay(self.opts.base_delay, exponent);
                    attempt += 1;
                    log::warn!(
                        "{url}: attempt {attempt}/{} failed: {e}, retrying in {:.1}s",
                        self.opts.max_retries,
                        delay.as_secs_f64()
                    );
                    std::thread::sleep(delay);
                }
                Err(e) => {
                    if !e.is_not_found() {
                        log::error!("{url}: failed permanently: {e}");
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Single request with a hard deadline on both headers and body.
    fn attempt(&self, url: &str) -> Result<String, FetchError> {
        let timeout = self.opts.timeout;
        SHARED_RUNTIME.handle().block_on(async {
            let send = http_client().get(url).send();
            let response = match tokio::time::timeout(timeout, send).await {
                Ok(Ok(resp)) => resp,
                Ok(Err(e)) => return Err(classify_reqwest(url, &e)),
                Err(_) => {
                    return Err(FetchError::Timeout {
                        url: url.to_string(),
                    });
                }
            };

            let status = response.status();
            if status.as_u16() == 404 {
                return Err(FetchError::NotFound {
                    url: url.to_string(),
                });
            }
            if !status.is_success() {
                return Err(FetchError::Http {
                    status: status.as_u16(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string(),
                });
            }

            match tokio::time::timeout(timeout, response.text()).await {
                Ok(Ok(body)) => Ok(body),
                Ok(Err(e)) => Err(classify_reqwest(url, &e)),
                Err(_) => Err(FetchError::Timeout {
                    url: url.to_string(),
                }),
            }
        })
    }
}

/// Map a reqwest error into the fetch taxonomy.
fn classify_reqwest(url: &str, e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = e.status() {
        FetchError::Http {
            status: status.as_u16(),
            message: e.to_string(),
        }
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_exponent() {
        let base = Duration::from_secs(2);
        assert_eq!(backoff_delay(base, 0), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(4));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(8));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(16));
    }

    #[test]
    fn backoff_survives_large_exponents() {
        // saturates instead of overflowing
        let d = backoff_delay(Duration::from_secs(2), 63);
        assert!(d >= Duration::from_secs(2));
    }

    #[test]
    fn default_options_sane() {
        let opts = FetchOptions::default();
        assert!(opts.max_retries >= 1);
        assert!(opts.base_delay > Duration::ZERO);
        assert!(opts.timeout > Duration::ZERO);
    }
}
