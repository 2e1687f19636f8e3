use chrono::Duration;
use chrono_tz::Tz;
use clubnight_domain::ReminderOffset;
use clubnight_utils::create_random_secret;
use tracing::{info, warn};

/// Credentials for the SMS provider. All three values are needed both to
/// send and to verify inbound webhook signatures; a partial set is treated
/// as absent.
#[derive(Debug, Clone)]
pub struct SmsProviderConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Externally visible base URL, used to reconstruct the exact request
    /// URL the SMS provider signed.
    pub public_url: String,
    /// The single club-wide IANA zone all civil event times live in.
    pub club_timezone: Tz,
    /// Domain of the calendar-invite reply addresses. Inbound identifiers
    /// on any other domain are rejected.
    pub reply_email_domain: String,
    /// Shared secret for admin actions and the scheduled trigger route.
    pub admin_secret: String,
    /// None disables outbound SMS and makes inbound SMS verification fail
    /// closed.
    pub sms_provider: Option<SmsProviderConfig>,
    /// Signing secret for the inbound email webhook (`whsec_...`). None is
    /// an operator error surfaced as a 5xx, distinct from a forged request.
    pub email_webhook_secret: Option<String>,
    /// Named lead times the sweep checks.
    pub reminder_offsets: Vec<ReminderOffset>,
    /// Tolerance around each offset. The trigger cadence must not exceed
    /// this or a window can be skipped entirely.
    pub reminder_window: Duration,
    /// Inbound SMS webhook cap per sender number per minute.
    pub sms_rate_limit_per_minute: i64,
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        let public_url =
            std::env::var("PUBLIC_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));

        let default_timezone = "America/Chicago";
        let club_timezone = std::env::var("CLUB_TIMEZONE").unwrap_or_else(|_| {
            info!(
                "Did not find CLUB_TIMEZONE environment variable. Using {}.",
                default_timezone
            );
            default_timezone.into()
        });
        let club_timezone = match club_timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                warn!(
                    "The given CLUB_TIMEZONE: {} is not a valid IANA zone, falling back to {}.",
                    club_timezone, default_timezone
                );
                default_timezone.parse().unwrap()
            }
        };

        let reply_email_domain = std::env::var("REPLY_EMAIL_DOMAIN").unwrap_or_else(|_| {
            warn!(
                "Did not find REPLY_EMAIL_DOMAIN environment variable. \
                 Calendar replies will only match the placeholder domain."
            );
            "rsvp.invalid".into()
        });

        let admin_secret = match std::env::var("ADMIN_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                info!("Did not find ADMIN_SECRET environment variable. Going to create one.");
                let secret = create_random_secret(16);
                info!("Admin secret was generated and set to: {}", secret);
                secret
            }
        };

        let sms_provider = match (
            std::env::var("TWILIO_ACCOUNT_SID"),
            std::env::var("TWILIO_AUTH_TOKEN"),
            std::env::var("TWILIO_FROM_NUMBER"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(from_number)) => Some(SmsProviderConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => {
                warn!(
                    "TWILIO_ACCOUNT_SID / TWILIO_AUTH_TOKEN / TWILIO_FROM_NUMBER are not all set. \
                     Outbound SMS is disabled and inbound SMS webhooks will be rejected."
                );
                None
            }
        };

        let email_webhook_secret = match std::env::var("EMAIL_WEBHOOK_SECRET") {
            Ok(secret) => Some(secret),
            Err(_) => {
                warn!(
                    "Did not find EMAIL_WEBHOOK_SECRET environment variable. \
                     The inbound email webhook will answer 500 until it is configured."
                );
                None
            }
        };

        Self {
            port,
            public_url,
            club_timezone,
            reply_email_domain,
            admin_secret,
            sms_provider,
            email_webhook_secret,
            reminder_offsets: vec![
                ReminderOffset::hours("24h", 24),
                ReminderOffset::hours("2h", 2),
            ],
            reminder_window: Duration::minutes(15),
            sms_rate_limit_per_minute: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
