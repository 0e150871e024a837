//! Infrastructure layer: the outbound side of the front end.
//!
//! Everything that talks to the upstream expense API lives here:
//! - `gateway`: request-scoped API gateway with the failure/exception policies
//! - `sign_in`: the one call that happens before a bearer token exists
//! - `endpoints`: upstream paths for the configured resource

pub mod endpoints;
pub mod gateway;
pub mod sign_in;

pub use endpoints::Endpoints;
pub use gateway::{
    API_ERROR_STATUS, FlashMessage, Gateway, GatewayConfig, GatewayError, Halt, Mode, RedirectTo,
    STATUS_FLASH_KEY, Timeouts,
};
pub use sign_in::{SignInError, sign_in};
