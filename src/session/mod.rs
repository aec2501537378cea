//! Store-backed sessions referenced by a signed cookie.
//!
//! Session bookkeeping is `tower_sessions`: id generation, rolling expiry,
//! cookie signing and id rotation all happen in its `SessionManagerLayer`.
//! This module supplies the stores behind it and the flash queue kept
//! inside each session.

pub mod flash;
pub mod store;

use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;

pub use flash::{FlashCategory, FlashExt, FlashMessage};
pub use store::{spawn_expired_deletion, MemorySessionStore, PgSessionStore, SessionBackend};
pub use tower_sessions::Session;

const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Stretch the configured secret to the 64 bytes a signing key needs
pub fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// How long an idle session lives; every save pushes the expiry out again
pub fn inactivity(ttl_secs: u64) -> time::Duration {
    // Clamp so expiry arithmetic can never overflow
    time::Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64)
}

/// Session ids are bearer secrets; log only a prefix
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
