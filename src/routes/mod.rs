pub mod admin;
pub mod auth;
pub mod bookings;
pub mod reviews;
pub mod services;
pub mod stylists;
pub mod users;

pub use admin::admin_config;
pub use auth::auth_config;
pub use bookings::bookings_config;
pub use reviews::reviews_config;
pub use services::services_config;
pub use stylists::stylists_config;
pub use users::users_config;
