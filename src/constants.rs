/// Base URL of the iplicit REST API
pub const DEFAULT_BASE_URL: &str = "https://api.iplicit.com/api";
/// Path of the session creation endpoint, relative to the base URL
pub const SESSION_PATH: &str = "session/create/api";
/// User agent string used in HTTP requests to identify this client
pub const USER_AGENT: &str = concat!("iplicit-client/", env!("CARGO_PKG_VERSION"));
/// Default timeout in seconds for a single HTTP exchange
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A token is refreshed this many seconds before its stated expiry
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 300;
/// Lifetime assumed when the session endpoint omits `tokenDue` (30 minutes)
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 1800;

/// Upstream ceiling of requests per rolling window
pub const RATE_LIMIT_MAX_REQUESTS: u32 = 1500;
/// Local threshold at which the client pauses until the window rolls over
pub const RATE_LIMIT_THRESHOLD: u32 = 1400;
/// Length of the rolling window in seconds (5 minutes)
pub const RATE_LIMIT_WINDOW_SECS: u64 = 300;

/// Total number of attempts for a request failing with a transient network error
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// First backoff delay in milliseconds, doubled after every failed attempt
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Length of an opaque iplicit identifier (UUID). Shorter values are treated as codes.
pub const IDENTIFIER_LENGTH: usize = 36;
/// Page size used when scanning a reference collection for a code
pub const LOOKUP_PAGE_SIZE: u32 = 100;
/// Currency used for new invoices when none is given
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Characters of upstream body kept in permission errors
pub const FORBIDDEN_EXCERPT_CHARS: usize = 200;
/// Characters of upstream body kept in validation and unexpected errors
pub const BODY_EXCERPT_CHARS: usize = 300;
/// Key wrapping a successful body that could not be parsed as JSON
pub const RAW_RESPONSE_KEY: &str = "raw_response";
