pub mod gym;
pub mod pool;
pub mod rdv;
pub mod user;

pub use gym::{Gym, GymDraft};
pub use pool::{Pool, PoolDraft};
pub use rdv::{Rdv, RdvDraft, Venue, VenueKind};
pub use user::{User, UserDraft};
