//! The meta-organism and its immune response

mod compatibility;
mod generation;
mod observer;
#[allow(clippy::module_inception)]
mod organism;
mod response;
mod state;

pub use compatibility::{BorderlinePolicy, Compatibility, Verdict};
pub use observer::{EventLog, NoopObserver, OrganismEvent, OrganismObserver};
pub use organism::MetaOrganism;
pub use response::{IntegrationReport, RejectionReport};
pub use state::OrganismState;
