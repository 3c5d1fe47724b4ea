pub mod origin;
pub mod rate_limit;
pub mod security;

pub use origin::{OriginPolicy, cors_layer, origin_guard};
pub use rate_limit::{Decision, FixedWindowLimiter, rate_limit_middleware};
pub use security::security_headers_middleware;
