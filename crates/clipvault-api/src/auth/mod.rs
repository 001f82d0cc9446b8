pub mod extractor;
pub mod jwt;

pub use extractor::AuthenticatedUser;
pub use jwt::JwtService;
