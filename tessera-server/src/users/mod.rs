pub mod account_handlers;
pub mod envelope;
pub mod profile_handlers;

pub use envelope::{EnvelopeReply, EnvelopeStatus, ProfileEnvelope};
