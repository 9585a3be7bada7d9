use crate::{
    store::CertificateStore,
    types::{ApiError, MirrorRecord, NewCertificate},
};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::{io, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

type SharedStore = Arc<dyn CertificateStore>;

/// Builds the mirror API router.
pub fn build_router(store: SharedStore) -> Router {
    let api = Router::new()
        .route("/certificates", get(list_certificates).post(create_certificate))
        .with_state(store);
    Router::new().nest("/api", api)
}

async fn list_certificates(State(store): State<SharedStore>) -> Json<Vec<MirrorRecord>> {
    Json(store.list().await)
}

async fn create_certificate(
    State(store): State<SharedStore>,
    payload: Result<Json<NewCertificate>, JsonRejection>,
) -> Response {
    let Json(new) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            debug!(target: "mirror", %rejection, "rejected malformed body");
            let body = ApiError { message: rejection.body_text(), field: None };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match store.insert(new).await {
        Ok(record) => {
            info!(
                target: "mirror",
                id = record.id,
                certificate_id = %record.certificate_id,
                "stored certificate"
            );
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(err) => {
            debug!(target: "mirror", %err, "rejected certificate");
            err.into_response()
        }
    }
}

/// The mirror HTTP server.
pub struct MirrorServer {
    bind: SocketAddr,
    store: SharedStore,
    local_addr: Option<SocketAddr>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MirrorServer {
    pub fn new(bind: SocketAddr, store: SharedStore) -> Self {
        Self { bind, store, local_addr: None, shutdown: None, handle: None }
    }

    /// Binds the listener and starts serving in the background.
    ///
    /// Returns the bound address, which differs from the requested one when binding port 0.
    pub async fn start(&mut self) -> io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.bind).await?;
        let addr = listener.local_addr()?;
        let router = build_router(self.store.clone());
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            if let Err(err) = axum::serve(listener, router).with_graceful_shutdown(shutdown).await {
                error!(target: "mirror", %err, "mirror server failed");
            }
        });

        info!(target: "mirror", %addr, "mirror listening");
        self.local_addr = Some(addr);
        self.shutdown = Some(tx);
        self.handle = Some(handle);
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Base URL of the running server.
    pub fn url(&self) -> Option<String> {
        self.local_addr.map(|addr| format!("http://{addr}"))
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the server and waits for in-flight requests to finish.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        self.local_addr = None;
        debug!(target: "mirror", "mirror stopped");
    }
}

impl std::fmt::Debug for MirrorServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorServer")
            .field("bind", &self.bind)
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}
