// Ordered authorization gates: authenticate -> check_valid_user ->
// require_supervisor. The gates run before the core handlers, which only
// consume the attached principal and never re-implement identity checks.

pub mod auth;
pub mod require_supervisor;
pub mod validate_user;

pub use auth::{authenticate, AuthUser};
pub use require_supervisor::require_supervisor;
pub use validate_user::check_valid_user;
