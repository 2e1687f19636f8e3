mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, SmsProviderConfig};
pub use repos::{
    IEventRepo, IPollRepo, IRateLimitRepo, IReminderRecordRepo, IRsvpRepo, IUserRepo,
    PollCloseOutcome, Repos, RsvpWriteResult,
};
pub use services::{DisabledSmsSender, ISmsSender, RecordingSmsSender, TwilioSmsSender};
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticSys};

#[derive(Clone)]
pub struct ClubContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub sms: Arc<dyn ISmsSender>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl ClubContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let config = Config::new();
        let sms: Arc<dyn ISmsSender> = match &config.sms_provider {
            Some(provider) => Arc::new(TwilioSmsSender::new(provider)),
            None => Arc::new(DisabledSmsSender),
        };
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            sms,
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> ClubContext {
    ClubContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

/// In-memory context for tests: no datastore, no provider traffic. Tests
/// swap in their own clock and recording sender as needed.
pub fn setup_test_context(config: Config) -> ClubContext {
    ClubContext {
        repos: Repos::create_inmemory(),
        config,
        sys: Arc::new(RealSys {}),
        sms: Arc::new(RecordingSmsSender::new()),
    }
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
