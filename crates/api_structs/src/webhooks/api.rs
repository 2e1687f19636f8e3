use crate::dtos::RsvpDTO;
use serde::{Deserialize, Serialize};

pub mod receive_sms {
    /// Response is TwiML, not JSON: a tiny XML document with at most one
    /// human-readable message.
    pub fn twiml_response(message: Option<&str>) -> String {
        match message {
            Some(message) => format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
                xml_escape(message)
            ),
            None => {
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>".to_string()
            }
        }
    }

    fn xml_escape(raw: &str) -> String {
        raw.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn renders_message_body() {
            assert_eq!(
                twiml_response(Some("See you there")),
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>See you there</Message></Response>"
            );
        }

        #[test]
        fn escapes_markup_in_message() {
            assert!(twiml_response(Some("Tom & Jerry's <grill>"))
                .contains("Tom &amp; Jerry's &lt;grill&gt;"));
        }

        #[test]
        fn renders_empty_response() {
            assert_eq!(
                twiml_response(None),
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>"
            );
        }
    }
}

pub mod receive_email {
    use super::*;

    /// Neutral acknowledgement for ignored or non-actionable deliveries.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AckResponse {
        pub message: String,
    }

    impl AckResponse {
        pub fn new(message: impl Into<String>) -> Self {
            Self {
                message: message.into(),
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct APIResponse {
        pub success: bool,
        pub data: RsvpDTO,
    }

    impl APIResponse {
        pub fn new(data: RsvpDTO) -> Self {
            Self {
                success: true,
                data,
            }
        }
    }
}
