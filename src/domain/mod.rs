//! The event entity, its draft form, and the lifecycle error taxonomy.

pub mod draft;
pub mod error;
pub mod event;

pub use draft::EventDraft;
pub use error::LifecycleError;
pub use event::{Event, EventPatch};
