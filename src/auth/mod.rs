pub mod bruteforce;
pub mod clock;
pub mod handler;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod verifier;

pub use bruteforce::*;
pub use clock::*;
pub use handler::*;
pub use jwt::*;
pub use middleware::*;
pub use verifier::*;
