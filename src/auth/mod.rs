pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;
pub mod utils;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AuthMiddleware, AuthenticatedUser};
pub use utils::{require_author, require_self};
