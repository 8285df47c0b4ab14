use focusreader::configuration::get_configuration;
use focusreader::configuration::DatabaseSettings;
use focusreader::startup::get_connection_pool;
use focusreader::startup::Application;
use focusreader::telemetry::get_subscriber;
use focusreader::telemetry::init_subscriber;
use once_cell::sync::Lazy;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

/// Init a static subscriber, once for the whole test binary.
///
/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the intuitive solution of assigning 2 different "closure types" to the
    // same var is not allowed by the compiler, hence the match arms
    match std::env::var("TEST_LOG") {
        Ok(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::stdout);
            init_subscriber(subscriber);
        }
        Err(_) => {
            let subscriber = get_subscriber("test", "debug", std::io::sink);
            init_subscriber(subscriber);
        }
    };
});

pub struct TestApp {
    pub addr: String,
    pub pool: PgPool,
}

impl TestApp {
    /// Convenience method for making a `/waitlist` `POST` request. Redirects
    /// are -not- followed, so callers can assert on the 303 itself; use a
    /// cookie-enabled client directly for the full submit-and-reload flow.
    pub async fn post_waitlist(
        &self,
        body: String,
    ) -> reqwest::Response {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        client
            .post(format!("{}/waitlist", self.addr))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .expect("execute request")
    }

    /// How many emails have been collected so far
    pub async fn waitlist_count(&self) -> i64 {
        use sqlx::Row;
        sqlx::query("SELECT COUNT(*) FROM waitlist")
            .fetch_one(&self.pool)
            .await
            .unwrap()
            .get(0)
    }
}

/// Read `DatabaseSettings` and create a db with a randomised name (but with the
/// same migrations/tables, specified in the `migrations` directory). The
/// connection to this db can then be used to run a single test.
async fn configure_database(cfg: &DatabaseSettings) -> PgPool {
    // connect to the top-level db
    let mut conn = PgConnection::connect_with(&cfg.connection_without_db())
        .await
        .expect("postgres must be running; run scripts/init_db.sh");

    // create randomised db (randomisation is done by caller, not here)
    conn.execute(format!(r#"CREATE DATABASE "{}";"#, cfg.database_name).as_str())
        .await
        .unwrap();

    // perform the migration(s) and create the table(s). `migrate!` path defaults to
    // "./migrations", where . is project root
    let pool = PgPool::connect_with(cfg.connection()).await.unwrap();
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("failed to migrate");
    pool
}

/// Spawn a `TestApp` against a freshly created, randomly named database, bound
/// to a random port.
///
/// Returns the address to which the server was bound, in the form
/// `http://localhost:{port}`; the `http://` prefix is important, as this is
/// the address that clients will send requests to.
pub async fn spawn_app() -> TestApp {
    // init the tracing subscriber once only
    Lazy::force(&TRACING);

    let cfg = {
        let mut rand_cfg = get_configuration().unwrap();
        let db_cfg = rand_cfg
            .database
            .as_mut()
            .expect("local configuration must declare a database");

        // random db name, so each test gets a clean table
        db_cfg.database_name = Uuid::new_v4().to_string();

        // port 0 is reserved by the OS; the server will be spawned on an address with a
        // random available port. this address/port must then be made known to clients
        rand_cfg.application.port = 0;

        rand_cfg
    };

    let db_cfg = cfg.database.clone().unwrap();
    configure_database(&db_cfg).await;

    let app = Application::build(cfg).await.unwrap();
    let addr = format!("http://localhost:{}", app.get_port());

    let pool = get_connection_pool(&db_cfg);
    tokio::spawn(app.run_until_stopped());

    TestApp { addr, pool }
}

/// Spawn the app with no database configured at all (the `demo` environment):
/// the waitlist store is disabled and every submission succeeds.
pub async fn spawn_demo_app() -> String {
    Lazy::force(&TRACING);

    let mut cfg = get_configuration().unwrap();
    cfg.database = None;
    cfg.application.port = 0;

    let app = Application::build(cfg).await.unwrap();
    let addr = format!("http://localhost:{}", app.get_port());
    tokio::spawn(app.run_until_stopped());
    addr
}
