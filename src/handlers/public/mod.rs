// handlers/public/mod.rs - endpoints reachable without a token
//
// Token acquisition (signup, login) and read-only listings that each portal
// exposes to anonymous visitors.

pub mod freelance;
pub mod registration;
pub mod storefront;
pub mod tutoring;
