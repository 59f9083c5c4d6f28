pub mod client_consts {
    //! Client Configuration Constants
    //!
    //! Cookie names, retry defaults and fixed messages shared by the HTTP
    //! facade and the error reporting layer.

    // =============================================================================
    // SESSION COOKIES
    // =============================================================================

    /// Cookie carrying the bearer token.
    pub const AUTH_TOKEN_COOKIE: &str = "authToken";

    /// Cookie caching the signed-in user. Cleared together with the token.
    pub const USER_COOKIE: &str = "user";

    // =============================================================================
    // HTTP
    // =============================================================================

    /// User-Agent string with client version
    pub const USER_AGENT: &str = concat!("wander-client/", env!("CARGO_PKG_VERSION"));

    /// Connect timeout for the reqwest client (seconds).
    /// There is no overall request timeout; calls run until the transport settles.
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    // =============================================================================
    // RETRY CONFIGURATION
    // =============================================================================

    pub mod retry {
        use std::time::Duration;

        /// Retries after the first attempt.
        pub const MAX_RETRIES: u32 = 3;

        /// Base delay, doubled after each failed attempt (milliseconds)
        pub const INITIAL_DELAY_MS: u64 = 300;

        /// Upper bound of the random jitter added to each delay (milliseconds)
        pub const MAX_JITTER_MS: u64 = 100;

        pub const fn initial_delay() -> Duration {
            Duration::from_millis(INITIAL_DELAY_MS)
        }
    }

    // =============================================================================
    // ERROR MESSAGES
    // =============================================================================

    pub mod messages {
        /// Returned when an error carries nothing usable.
        pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

        /// Returned when a structured payload cannot be stringified.
        pub const REQUEST_ERROR_FALLBACK: &str = "An error occurred with the request";

        /// Lowercased markers that identify connectivity failures.
        pub const NETWORK_ERROR_MARKERS: [&str; 7] = [
            "network error",
            "failed to fetch",
            "network request failed",
            "network timeout",
            "offline",
            "connection refused",
            "connection failed",
        ];
    }
}
