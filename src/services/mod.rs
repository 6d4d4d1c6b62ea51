pub mod catalog_service;
pub mod watch_service;
pub mod notification_service;
pub mod profile_service;
pub mod geo_service;
pub mod mailer_service;
pub mod auth_service;

pub use catalog_service::CatalogService;
pub use watch_service::WatchService;
pub use notification_service::NotificationService;
pub use profile_service::ProfileService;
pub use geo_service::GeoService;
pub use mailer_service::MailerService;
pub use auth_service::AuthService;
