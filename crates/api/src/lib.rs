mod error;
mod poll;
mod reminders;
mod shared;
mod status;
mod webhooks;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use clubnight_infra::ClubContext;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    poll::configure_routes(cfg);
    reminders::configure_routes(cfg);
    status::configure_routes(cfg);
    webhooks::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: ClubContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context).await?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(context: ClubContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .configure(configure_server_api)
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use chrono::prelude::*;
    use chrono::Duration;
    use clubnight_domain::{
        default_event_time, Event, EventStatus, NewEvent, NewUser, ReminderOffset, User,
        UserStatus,
    };
    use clubnight_infra::{setup_test_context, ClubContext, Config, SmsProviderConfig};

    pub fn test_config() -> Config {
        Config {
            port: 5000,
            public_url: "https://club.example".into(),
            club_timezone: chrono_tz::America::Chicago,
            reply_email_domain: "club.example".into(),
            admin_secret: "admin-secret".into(),
            sms_provider: Some(SmsProviderConfig {
                account_sid: "AC0123456789".into(),
                auth_token: "token123".into(),
                from_number: "+13125550100".into(),
            }),
            email_webhook_secret: Some("whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw".into()),
            reminder_offsets: vec![
                ReminderOffset::hours("24h", 24),
                ReminderOffset::hours("2h", 2),
            ],
            reminder_window: Duration::minutes(15),
            sms_rate_limit_per_minute: 10,
        }
    }

    pub fn test_context() -> ClubContext {
        setup_test_context(test_config())
    }

    pub async fn upcoming_event(ctx: &ClubContext, year: i32, month: u32, day: u32) -> Event {
        ctx.repos
            .events
            .insert(&NewEvent {
                restaurant_name: "Lou Mitchell's".into(),
                restaurant_address: Some("565 W Jackson Blvd".into()),
                event_date: NaiveDate::from_ymd(year, month, day),
                event_time: default_event_time(),
                status: EventStatus::Upcoming,
            })
            .await
            .unwrap()
    }

    pub async fn member(ctx: &ClubContext, name: &str, phone: &str) -> User {
        ctx.repos
            .users
            .insert(&NewUser {
                name: name.into(),
                email: format!("{}@example.com", name),
                phone: Some(phone.into()),
                sms_opt_in: true,
                sms_opted_out_at: None,
                status: UserStatus::Active,
            })
            .await
            .unwrap()
    }
}
