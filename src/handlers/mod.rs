// handlers/mod.rs - three security tiers, one file per portal in each
//
// public    -> no token (/<portal>/auth/*, catalog and profile reads)
// protected -> token issued by the portal (/<portal>/api/*)
// elevated  -> token issued by the portal with the admin role (/<portal>/api/admin/*)

pub mod elevated;
pub mod protected;
pub mod public;
