//! Configuration module

mod site;

pub use site::GitConfig;
pub use site::Layout;
pub use site::SiteConfig;
