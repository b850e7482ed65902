pub mod claims;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;

pub use claims::{Claims, Identity};
pub use guard::{require_identity, require_owner};
pub use jwt::{JwtService, TokenError};
pub use middleware::SessionMiddleware;
pub use password::PasswordHasher;
pub use session::resolve_session;
