// Services module

pub mod rate_limit;

pub use rate_limit::{EndpointClass, RateLimitConfig, RateLimitResult, RateLimitService};
