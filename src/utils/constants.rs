//! Shared constants and invariants

pub const DEFAULT_SPIFFE_SOCKET_PATH: &str = "unix:///tmp/spire-agent/public/api.sock";
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const DEFAULT_STS_URL: &str = "https://sts.googleapis.com/v1/token";
pub const DEFAULT_IAM_CREDENTIALS_URL: &str = "https://iamcredentials.googleapis.com";
pub const DEFAULT_STORAGE_URL: &str = "https://storage.googleapis.com";

pub const DEFAULT_IDENTITY_FETCH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 0;

// RFC 8693 token exchange
pub const GRANT_TYPE_TOKEN_EXCHANGE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
pub const TOKEN_TYPE_ACCESS_TOKEN: &str = "urn:ietf:params:oauth:token-type:access_token";
pub const TOKEN_TYPE_JWT: &str = "urn:ietf:params:oauth:token-type:jwt";

pub const BEARER: &str = "Bearer";
