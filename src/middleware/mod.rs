pub mod auth;
pub mod body;
pub mod flash;
pub mod session;
pub mod static_assets;
pub mod view_context;

pub use auth::{authentication_middleware, CurrentUser};
pub use body::Payload;
pub use flash::{flash_relay_middleware, FlashMessages};
pub use session::session_middleware;
pub use static_assets::{static_assets_middleware, StaticAssets};
pub use view_context::view_context_middleware;
