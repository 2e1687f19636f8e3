mod sms;

pub use sms::{DisabledSmsSender, ISmsSender, RecordingSmsSender, TwilioSmsSender};
