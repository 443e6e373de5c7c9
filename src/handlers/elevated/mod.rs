// handlers/elevated/mod.rs - admin consoles under /<portal>/api/admin
//
// Every route here sits behind the JWT middleware and `require_roles(admin)`.

pub mod freelance;
pub mod registration;
pub mod storefront;
pub mod tutoring;
