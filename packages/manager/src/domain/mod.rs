//! Domain layer: session model, event taxonomy, and the trait seams the
//! infrastructure layer implements (dependency inversion).

pub mod event;
pub mod registry;
pub mod session;
pub mod sink;
pub mod transport;

pub use event::{ActorCategory, EventKind, KillActor, SessionEvent, TimedEvent};
pub use registry::SessionRegistry;
pub use session::{PollerConfig, ServerRef, Session, SessionStatus};
pub use sink::EventSink;
pub use transport::{CommandTransport, TransportError};
