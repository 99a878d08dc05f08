pub mod admin;
pub mod exam;
pub mod subscription;

pub use admin::admin_config;
pub use exam::exam_config;
pub use subscription::subscription_config;
