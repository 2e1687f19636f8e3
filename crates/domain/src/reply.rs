use crate::rsvp::RsvpStatus;
use crate::shared::entity::ID;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Upper bound on how much of an inbound body is scanned. Replies of
/// interest fit comfortably; anything past this is relay padding or abuse.
const MAX_SCAN_LEN: usize = 64 * 1024;

/// What a member meant with a free-text SMS body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsIntent {
    Yes,
    No,
    OptOut,
    Help,
}

const OPT_OUT_KEYWORDS: &[&str] = &["stop", "stopall", "unsubscribe", "cancel", "end", "quit"];
const HELP_KEYWORDS: &[&str] = &["help", "info"];
const YES_KEYWORDS: &[&str] = &["yes", "y", "yeah", "yep", "yup", "sure", "ok", "okay", "in"];
const NO_KEYWORDS: &[&str] = &["no", "n", "nope", "nah", "out"];

fn classify_keyword(word: &str) -> Option<SmsIntent> {
    if OPT_OUT_KEYWORDS.contains(&word) {
        Some(SmsIntent::OptOut)
    } else if HELP_KEYWORDS.contains(&word) {
        Some(SmsIntent::Help)
    } else if YES_KEYWORDS.contains(&word) {
        Some(SmsIntent::Yes)
    } else if NO_KEYWORDS.contains(&word) {
        Some(SmsIntent::No)
    } else {
        None
    }
}

/// Extracts intent from an SMS body.
///
/// The whole body with non-letters stripped is matched first ("ye s!" still
/// opts in), then the first alphabetic token ("no thanks" means no). Text we
/// cannot classify is None; the caller answers with help copy instead of
/// erroring.
pub fn parse_sms_reply(body: &str) -> Option<SmsIntent> {
    let body = truncate(body, MAX_SCAN_LEN);
    let lowered = body.to_lowercase();

    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    if let Some(intent) = classify_keyword(&stripped) {
        return Some(intent);
    }

    let first_token = lowered
        .split(|c: char| !c.is_ascii_alphabetic())
        .find(|token| !token.is_empty())?;
    classify_keyword(first_token)
}

/// iCalendar participation status as it appears in calendar replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Partstat {
    Accepted,
    Declined,
    Tentative,
    NeedsAction,
}

impl Partstat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
            Self::Tentative => "TENTATIVE",
            Self::NeedsAction => "NEEDS-ACTION",
        }
    }

    /// Fixed mapping into RSVP statuses. NEEDS-ACTION arrives when a client
    /// sends a counter or a bare acknowledgement; treat it as maybe.
    pub fn to_rsvp_status(&self) -> RsvpStatus {
        match self {
            Self::Accepted => RsvpStatus::Yes,
            Self::Declined => RsvpStatus::No,
            Self::Tentative => RsvpStatus::Maybe,
            Self::NeedsAction => RsvpStatus::Maybe,
        }
    }
}

/// A parsed calendar reply: which invite it answers and how.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarReply {
    /// The full matched identifier, e.g. `event-123-7@club.example`.
    pub event_uid: String,
    pub event_id: ID,
    /// Present when the invite embedded the recipient's member id as the
    /// second numeric component of the identifier.
    pub recipient_id: Option<ID>,
    pub partstat: Partstat,
}

/// Finds RSVP data in calendar-reply email bodies.
///
/// Built per configured reply domain so tests can supply their own. The
/// identifier grammar is strict: `event-<digits>(-<digits>)?@<domain>` with
/// the domain compared byte-for-byte. Bodies are treated as opaque text;
/// markup is never interpreted.
#[derive(Debug, Clone)]
pub struct CalendarReplyParser {
    domain: String,
    uid_re: Regex,
    partstat_re: Regex,
}

impl CalendarReplyParser {
    pub fn new(reply_domain: &str) -> Self {
        // The domain is captured loosely and compared exactly afterwards,
        // so `club.example.evil.com` cannot pass for `club.example`.
        let uid_re = Regex::new(r"event-(\d{1,10})(?:-(\d{1,10}))?@([A-Za-z0-9.-]+)")
            .expect("uid pattern is valid");
        let partstat_re = Regex::new(r"\b(ACCEPTED|DECLINED|TENTATIVE|NEEDS-ACTION)\b")
            .expect("partstat pattern is valid");
        Self {
            domain: reply_domain.to_string(),
            uid_re,
            partstat_re,
        }
    }

    pub fn parse(&self, text: &str, html: &str, subject: &str) -> Option<CalendarReply> {
        let haystack = format!(
            "{}\n{}",
            truncate(text, MAX_SCAN_LEN),
            truncate(html, MAX_SCAN_LEN)
        );

        let captures = self.uid_re.captures(&haystack)?;
        if &captures[3] != self.domain {
            return None;
        }
        let event_id: ID = captures[1].parse().ok()?;
        let recipient_id: Option<ID> = captures.get(2).and_then(|m| m.as_str().parse().ok());

        let partstat = self
            .find_partstat(&haystack)
            .or_else(|| subject_partstat(subject))
            .unwrap_or(Partstat::NeedsAction);

        Some(CalendarReply {
            event_uid: captures[0].to_string(),
            event_id,
            recipient_id,
            partstat,
        })
    }

    fn find_partstat(&self, haystack: &str) -> Option<Partstat> {
        match self.partstat_re.find(haystack)?.as_str() {
            "ACCEPTED" => Some(Partstat::Accepted),
            "DECLINED" => Some(Partstat::Declined),
            "TENTATIVE" => Some(Partstat::Tentative),
            "NEEDS-ACTION" => Some(Partstat::NeedsAction),
            _ => None,
        }
    }
}

/// Mail clients that omit PARTSTAT usually still say it in the subject:
/// "Accepted: Dinner at Lou's".
fn subject_partstat(subject: &str) -> Option<Partstat> {
    let subject = truncate(subject, 1024).to_lowercase();
    if subject.contains("accept") {
        Some(Partstat::Accepted)
    } else if subject.contains("declin") {
        Some(Partstat::Declined)
    } else if subject.contains("tentative") || subject.contains("maybe") {
        Some(Partstat::Tentative)
    } else {
        None
    }
}

fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_sms_keywords() {
        assert_eq!(parse_sms_reply("YES"), Some(SmsIntent::Yes));
        assert_eq!(parse_sms_reply("yes please"), Some(SmsIntent::Yes));
        assert_eq!(parse_sms_reply("N"), Some(SmsIntent::No));
        assert_eq!(parse_sms_reply("No thanks"), Some(SmsIntent::No));
        assert_eq!(parse_sms_reply("STOP"), Some(SmsIntent::OptOut));
        assert_eq!(parse_sms_reply("unsubscribe"), Some(SmsIntent::OptOut));
        assert_eq!(parse_sms_reply("HELP"), Some(SmsIntent::Help));
        assert_eq!(parse_sms_reply("maybe"), None);
        assert_eq!(parse_sms_reply(""), None);
        assert_eq!(parse_sms_reply("🎉🎉"), None);
    }

    #[test]
    fn strips_punctuation_before_classifying() {
        assert_eq!(parse_sms_reply("y e s"), Some(SmsIntent::Yes));
        assert_eq!(parse_sms_reply("ok!"), Some(SmsIntent::Yes));
        assert_eq!(parse_sms_reply("  nope.  "), Some(SmsIntent::No));
    }

    #[test]
    fn first_alphabetic_token_wins_when_whole_body_fails() {
        assert_eq!(parse_sms_reply("yes, see you there!"), Some(SmsIntent::Yes));
        assert_eq!(parse_sms_reply("no - out of town"), Some(SmsIntent::No));
        // First token unrecognized means the whole message is unrecognized
        assert_eq!(parse_sms_reply("count me in"), None);
    }

    fn parser() -> CalendarReplyParser {
        CalendarReplyParser::new("club.example")
    }

    #[test]
    fn parses_calendar_reply_with_partstat() {
        let reply = parser()
            .parse("UID:event-123@club.example\nPARTSTAT:ACCEPTED", "", "")
            .unwrap();
        assert_eq!(reply.event_uid, "event-123@club.example");
        assert_eq!(reply.event_id, ID::new(123));
        assert_eq!(reply.recipient_id, None);
        assert_eq!(reply.partstat, Partstat::Accepted);
    }

    #[test]
    fn parses_recipient_component() {
        let reply = parser()
            .parse("UID:event-123-7@club.example\nPARTSTAT:DECLINED", "", "")
            .unwrap();
        assert_eq!(reply.event_id, ID::new(123));
        assert_eq!(reply.recipient_id, Some(ID::new(7)));
        assert_eq!(reply.partstat, Partstat::Declined);
    }

    #[test]
    fn rejects_foreign_domains() {
        let parser = CalendarReplyParser::new("evil.example");
        assert_eq!(
            parser.parse("UID:event-123@club.example\nPARTSTAT:ACCEPTED", "", ""),
            None
        );
        // Suffixed domain is a different domain
        assert_eq!(
            parser.parse("UID:event-1@evil.example.com", "", ""),
            None
        );
        // Case differences are different domains
        assert_eq!(parser.parse("UID:event-1@Evil.Example", "", ""), None);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert_eq!(parser().parse("event-@club.example", "", ""), None);
        assert_eq!(parser().parse("event-abc@club.example", "", ""), None);
        assert_eq!(parser().parse("evt-12@club.example", "", ""), None);
        assert_eq!(parser().parse("nothing here", "", ""), None);
    }

    #[test]
    fn finds_identifier_in_html_body() {
        let html = "<div>UID:<b>event-9@club.example</b> PARTSTAT:TENTATIVE</div>";
        let reply = parser().parse("", html, "").unwrap();
        assert_eq!(reply.event_id, ID::new(9));
        assert_eq!(reply.partstat, Partstat::Tentative);
    }

    #[test]
    fn falls_back_to_subject_keywords() {
        let reply = parser()
            .parse("event-5@club.example", "", "Accepted: Dinner at Lou's")
            .unwrap();
        assert_eq!(reply.partstat, Partstat::Accepted);

        let reply = parser()
            .parse("event-5@club.example", "", "Declined: Dinner")
            .unwrap();
        assert_eq!(reply.partstat, Partstat::Declined);

        let reply = parser()
            .parse("event-5@club.example", "", "maybe?")
            .unwrap();
        assert_eq!(reply.partstat, Partstat::Tentative);
    }

    #[test]
    fn defaults_to_needs_action() {
        let reply = parser()
            .parse("event-5@club.example", "", "Re: Dinner")
            .unwrap();
        assert_eq!(reply.partstat, Partstat::NeedsAction);
        assert_eq!(reply.partstat.to_rsvp_status(), RsvpStatus::Maybe);
    }

    #[test]
    fn survives_oversized_and_adversarial_input() {
        let mut big = "x".repeat(2 * MAX_SCAN_LEN);
        big.push_str("event-5@club.example");
        // Identifier sits beyond the scan cap: not found, not a hang
        assert_eq!(parser().parse(&big, "", ""), None);

        let mut front = String::from("UID:event-5@club.example ACCEPTED ");
        front.push_str(&"a@".repeat(MAX_SCAN_LEN));
        let reply = parser().parse(&front, "", "").unwrap();
        assert_eq!(reply.event_id, ID::new(5));
    }

    #[test]
    fn partstat_mapping_table() {
        assert_eq!(Partstat::Accepted.to_rsvp_status(), RsvpStatus::Yes);
        assert_eq!(Partstat::Declined.to_rsvp_status(), RsvpStatus::No);
        assert_eq!(Partstat::Tentative.to_rsvp_status(), RsvpStatus::Maybe);
        assert_eq!(Partstat::NeedsAction.to_rsvp_status(), RsvpStatus::Maybe);
    }
}
