pub mod freelance;
pub mod registration;
pub mod storefront;
pub mod tutoring;
