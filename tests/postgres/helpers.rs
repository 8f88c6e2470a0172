//! Shared helpers for `PostgreSQL` integration tests.

use std::sync::Arc;

use canopy::todo::{
    adapters::postgres::{self, PostgresTodoStore},
    domain::{CredentialHash, EmailAddress, User, Username},
    ports::{TodoStore, UserIdentity},
    services::TodoService,
};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Template database holding the applied schema.
const TEMPLATE_DB: &str = "canopy_test_template";

/// Service type used by the `PostgreSQL` tests.
pub type PgTodoService = TodoService<PostgresTodoStore, DefaultClock>;

/// A store backed by a fresh database plus a registered user.
///
/// The database is dropped when the harness goes out of scope.
pub struct PgHarness {
    pub store: Arc<PostgresTodoStore>,
    pub service: PgTodoService,
    pub caller: UserIdentity,
    pub runtime: Runtime,
    _cleanup: CleanupGuard,
}

/// Creates a multi-threaded runtime for driving the async store.
///
/// # Errors
///
/// Returns an error when the runtime cannot be built.
pub fn test_runtime() -> eyre::Result<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?)
}

/// Creates a database for one test from the schema template and registers
/// an owner in it.
///
/// # Errors
///
/// Returns an error when the cluster cannot provide the database, the pool
/// cannot connect, or the owner cannot be stored.
pub fn setup(cluster: &'static TestCluster, prefix: &str) -> eyre::Result<PgHarness> {
    ensure_template(cluster)?;
    let db_name = format!("{prefix}_{}", Uuid::new_v4().simple());
    cluster
        .create_database_from_template(&*db_name, TEMPLATE_DB)
        .map_err(|err| eyre::eyre!("create {db_name}: {err}"))?;
    let cleanup = CleanupGuard {
        cluster,
        db_name: db_name.clone(),
    };

    let pool = postgres::build_pool(&cluster.connection().database_url(&db_name), 4)?;
    let store = Arc::new(PostgresTodoStore::new(pool));
    let runtime = test_runtime()?;
    let caller = runtime.block_on(register(&store, &unique_name("owner")))?;
    Ok(PgHarness {
        service: TodoService::new(Arc::clone(&store), Arc::new(DefaultClock)),
        store,
        caller,
        runtime,
        _cleanup: cleanup,
    })
}

fn ensure_template(cluster: &TestCluster) -> eyre::Result<()> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut connection =
                PgConnection::establish(&url).map_err(|err| eyre::eyre!("{err}"))?;
            connection
                .batch_execute(postgres::SCHEMA_SQL)
                .map_err(|err| eyre::eyre!("apply schema: {err}"))?;
            Ok(())
        })
        .map_err(|err| eyre::eyre!("template setup: {err}"))
}

/// Drops the per-test database even when the test panics.
struct CleanupGuard {
    cluster: &'static TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    #[expect(clippy::print_stderr, reason = "cleanup failures are informational")]
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(&*self.db_name) {
            eprintln!("warning: failed to drop test database {}: {err}", self.db_name);
        }
    }
}

/// Returns `prefix` with a random suffix so concurrent tests never collide.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Stores a user named `username` and returns its identity.
///
/// # Errors
///
/// Returns an error when the user cannot be stored.
pub async fn register(
    store: &PostgresTodoStore,
    username: &str,
) -> Result<UserIdentity, eyre::Report> {
    let user = User::new(
        Username::new(username)?,
        EmailAddress::new(format!("{username}@example.com"))?,
        CredentialHash::new("$argon2id$placeholder"),
        &DefaultClock,
    );
    store.store_user(&user).await?;
    Ok(UserIdentity::new(user.id(), user.username().as_str()))
}
