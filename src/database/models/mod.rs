pub mod booking;
pub mod review;
pub mod service;
pub mod stylist;
pub mod user;

pub use booking::*;
pub use review::*;
pub use service::*;
pub use stylist::*;
pub use user::*;

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_STYLIST: &str = "stylist";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPERADMIN: &str = "superadmin";
