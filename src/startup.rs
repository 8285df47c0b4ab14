use std::net::TcpListener;
use std::time::Duration;

use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use secrecy::ExposeSecret;
use secrecy::Secret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_actix_web::TracingLogger;

use crate::configuration::DatabaseSettings;
use crate::configuration::Settings;
use crate::routes::health_check;
use crate::routes::home;
use crate::routes::join_waitlist;
use crate::store::WaitlistStore;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Wrapper over `startup::run` that builds a `Server`. The waitlist store
    /// is decided here, once: a database in the config means Postgres, no
    /// database means the disabled store (submissions logged, always succeed).
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // get the randomised port assigned by OS; this will be saved in the `port`
        // field
        let port = listener.local_addr()?.port();

        let store = match &cfg.database {
            Some(db_cfg) => WaitlistStore::Postgres(get_connection_pool(db_cfg)),
            None => WaitlistStore::Disabled,
        };

        let server = run(listener, store, cfg.application.cookie_secret)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// `connect_lazy_with` only connects when the pool is used for the first time,
/// so db-free requests (e.g. health_check) never touch postgres.
///
/// The acquire timeout bounds how long a submission can hang on an unreachable
/// database; past it, the insert resolves to the generic failure path instead
/// of holding the request open indefinitely.
pub fn get_connection_pool(db_cfg: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(3))
        .connect_lazy_with(db_cfg.connection())
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    store: WaitlistStore,
    cookie_secret: Secret<String>,
) -> Result<Server, anyhow::Error> {
    // the flash cookie carrying the success banner across the redirect is signed,
    // so the client cannot forge or tamper with it
    let secret_key = Key::from(cookie_secret.expose_secret().as_bytes());
    let cookie_store = CookieMessageStore::builder(secret_key).build();
    let msg_framework = FlashMessagesFramework::builder(cookie_store).build();

    // `Data` is externally an `Arc` (for sharing/cloning), internally a `HashMap`
    // (for wrapping arbitrary types)
    let store = Data::new(store);

    // note the closure; actix spins up a worker per core, each running its own
    // copy of the `App`, which is why everything captured must be cloneable
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default()) // wrap the whole app in tracing middleware
            .wrap(msg_framework.clone()) // like tracing, but for the browser
            // remember, the guard must match the client's request type
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .route("/waitlist", web::post().to(join_waitlist))
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server) // sync return -- caller uses foo()?.await
}
