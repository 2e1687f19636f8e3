mod route_guards;
mod signature;

pub use route_guards::{protect_admin_route, protect_email_webhook, protect_sms_webhook};
pub use signature::{verify_email_signature, verify_sms_signature};
