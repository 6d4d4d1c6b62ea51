pub mod watch;
pub mod notification;
pub mod profile;

pub use watch::Entity as Watch;
pub use notification::Entity as Notification;
pub use profile::Entity as Profile;
