// Request/response layers every API call goes through
pub mod authorize;
pub mod unauthorized;

pub use authorize::RequestAuthorizer;
pub use unauthorized::UnauthorizedInterceptor;
