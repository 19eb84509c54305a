pub mod csrf_protection;
pub mod error;
pub mod form;
pub mod routes;
pub mod session;
pub mod templating;

pub use csrf_protection::CsrfSafeForm;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use error::AppError;
use futures_util::{pin_mut, Future};
use http::Request;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use minicursos_config::Config;
use minicursos_database::memory::MemoryRegistrationStore;
use minicursos_database::{PgRegistrationStore, RegistrationStore};
use routes::index::index;
use routes::indexcss::indexcss;
use routes::login::{login, login_page};
use routes::logout::logout;
use routes::not_found::not_found;
use routes::registrations::create::create;
use routes::registrations::list::list;
use routes::sucesso::sucesso;
use templating::Templates;
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::{watch, Mutex, MutexGuard};
use tower::ServiceExt as _;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct AdminConfig {
    pub password: String,
    pub public_listing: bool,
}

/// Serializes the capacity check and the insert of registrations within this
/// process. Several processes on the same database can still overshoot.
#[derive(Clone, Default)]
pub struct AdmissionLock(Arc<Mutex<()>>);

impl AdmissionLock {
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Arc<dyn RegistrationStore>,
    pub key: Key,
    pub templates: Arc<Templates>,
    pub admin: Arc<AdminConfig>,
    pub admission: AdmissionLock,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        key: Key,
        admin: AdminConfig,
    ) -> Result<Self, AppError> {
        Ok(Self {
            store,
            key,
            templates: Arc::new(Templates::new()?),
            admin: Arc::new(admin),
            admission: AdmissionLock::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let config = config.clone().validate()?;
        let store: Arc<dyn RegistrationStore> = if let Some(database_url) = &config.database_url {
            Arc::new(PgRegistrationStore::connect(database_url)?)
        } else {
            warn!("no database_url configured, registrations are only kept in memory");
            Arc::new(MemoryRegistrationStore::new())
        };
        let key = if let Some(secret_key) = &config.secret_key {
            Key::derive_from(secret_key.as_bytes())
        } else {
            warn!("no secret_key configured, admin sessions end with the process");
            Key::generate()
        };
        Self::new(
            store,
            key,
            AdminConfig {
                password: config.admin_password.clone(),
                public_listing: config.public_listing,
            },
        )
    }
}

pub fn router(state: AppState) -> Router {
    // layers are in reverse order
    Router::new()
        .route("/", get(index).post(create))
        .route("/sucesso", get(sucesso))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/inscritos", get(list))
        .route("/index.css", get(indexcss))
        .fallback(not_found)
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

#[allow(clippy::cognitive_complexity)]
pub async fn run_server(
    config: Config,
) -> Result<impl Future<Output = Result<(), AppError>>, AppError> {
    info!("starting up server...");

    let app = router(AppState::from_config(&config)?);

    let listener = TcpListener::bind(config.listen_address).await?;

    // tell the connections to shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let shutdown_tx = Arc::new(shutdown_tx);

    // wait for the connections to finish shutdown
    let (closed_tx, closed_rx) = watch::channel(());

    info!(address = %config.listen_address, "started up server...");

    Ok(async move {
        let shutdown = shutdown_signal();
        pin_mut!(shutdown);

        #[allow(clippy::redundant_pub_crate)]
        loop {
            select! {
                accept = listener.accept() => {
                    let (socket, remote_addr) = match accept {
                        Ok(accept) => accept,
                        Err(err) => {
                            warn!("failed to accept connection: {err:#}");
                            continue;
                        }
                    };

                    let tower_service = app.clone();
                    let shutdown_tx = Arc::clone(&shutdown_tx);
                    let closed_rx = closed_rx.clone();

                    tokio::spawn(async move {
                        let socket = TokioIo::new(socket);

                        let hyper_service = hyper::service::service_fn(move |request: Request<Incoming>| {
                            tower_service.clone().oneshot(request)
                        });

                        let builder = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new());
                        let connection = builder.serve_connection_with_upgrades(socket, hyper_service);
                        pin_mut!(connection);

                        let connection_result = select! {
                            connection_result = connection.as_mut() => connection_result,
                            () = shutdown_tx.closed() => {
                                connection.as_mut().graceful_shutdown();
                                connection.as_mut().await
                            }
                        };
                        if let Err(err) = connection_result {
                            error!("failed to serve connection: {err:#}");
                        }
                        debug!(%remote_addr, "connection closed");

                        drop(closed_rx);
                    });
                }
                () = &mut shutdown => {
                    warn!("shutting down, waiting for open connections");
                    drop(shutdown_rx); // initiate shutdown
                    drop(closed_rx);
                    closed_tx.closed().await;
                    break;
                }
            }
        }

        info!("server stopped");
        Ok(())
    })
}

async fn wait_forever() {
    core::future::pending::<()>().await;
}

#[allow(clippy::redundant_pub_crate)]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {err}");
            wait_forever().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install signal handler: {err}");
                wait_forever().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = wait_forever();

    select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
