use std::time::Duration;

/// Configuration for HTTP fetching.
///
/// ```
/// use relcat_fetch::FetchOptions;
/// use std::time::Duration;
///
/// let options = FetchOptions::default()
///     .request_timeout(Duration::from_secs(30))
///     .header("Accept", "application/json");
/// ```
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,

    /// Upper bound for one request, body included.
    pub request_timeout: Duration,

    pub user_agent: String,

    /// Extra headers sent with every GET.
    pub headers: Vec<(String, String)>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent:      concat!("relcat/", env!("CARGO_PKG_VERSION")).to_string(),
            headers:         Vec::new(),
        }
    }
}

impl FetchOptions {
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}
