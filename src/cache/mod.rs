pub mod token;
pub mod token_source;

pub use token::CachedToken;
pub use token_source::{spiffe_token_source, CachingTokenSource, TokenProvider};
