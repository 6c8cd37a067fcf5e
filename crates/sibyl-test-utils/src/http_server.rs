use axum::Router;
use tokio::net::TcpListener;
use url::Url;

/// Axum router served on a random localhost port, shut down on drop.
pub struct TestHttpServer {
    base_url: Url,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestHttpServer {
    /// Spawn `router` and wait until the listener is live.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind or the base URL fails to parse.
    pub async fn new(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture listener");
        let addr = listener.local_addr().expect("read fixture listener addr");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });

        tokio::spawn(async move {
            server.await.expect("run fixture server");
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).expect("parse fixture base URL"),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Join `path` onto the server base URL.
    ///
    /// # Panics
    ///
    /// Panics if the join fails.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("join fixture URL path")
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Drop for TestHttpServer {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}
