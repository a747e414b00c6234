//! Typed property-bag configurations and the text codec used to persist them.

pub mod codec;
mod configuration;
mod error;
mod fixture;
mod value;

pub use codec::{deserialize, serialize, FORMAT_VERSION};
pub use configuration::Configuration;
pub use error::CodecError;
pub use fixture::{load_or_init, FixtureError, FixtureOutcome};
pub use value::{OpaqueValue, Value};
