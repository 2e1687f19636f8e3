mod poll;
mod reminders;
mod status;
mod webhooks;

pub mod dtos {
    pub use crate::poll::dtos::*;
    pub use crate::reminders::dtos::*;
    pub use crate::webhooks::dtos::*;
}

pub use crate::poll::api::*;
pub use crate::reminders::api::*;
pub use crate::status::api::*;
pub use crate::webhooks::api::*;
