pub use sui_faucet_types::error::{Error, FcResult};
pub use sui_faucet_types::types::{RateLimitInfo, Source, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
