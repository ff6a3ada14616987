/// Authentication module
///
/// Password hashing, access token signing, refresh token storage and the
/// session service that ties them together.

mod bearer;
mod claims;
mod extractor;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use bearer::get_bearer_token;
pub use claims::Claims;
pub use extractor::AuthenticatedUser;
pub use jwt::AccessTokenCodec;
pub use password::{hash_password, verify_password};
pub use refresh_token::{generate_refresh_token, RefreshTokenStore};
pub use session::{Session, SessionService, TokenLifetimes};
