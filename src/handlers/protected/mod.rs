// handlers/protected/mod.rs - endpoints behind the portal's JWT
//
// The router applies the token check and, where a route belongs to one role,
// the role gate. Handlers take the caller from `Extension<AuthUser>`.

pub mod freelance;
pub mod registration;
pub mod storefront;
pub mod tutoring;
