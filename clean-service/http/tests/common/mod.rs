use std::{path::Path, sync::Arc, time::Duration};

use axum::serve;
use clean_application::{CleanFileUseCase, CleanFileUseCaseImpl};
use clean_configuration::ServerConfig;
use clean_domain::{ScratchSpacePort, TransformPort};
use clean_http_server::{build_router, AppState, CLEAN_ROUTE};
use clean_infra::{ProcessTransformer, TempScratchSpaceProvider};
use reqwest::{multipart, Client, Response};
use tokio::{net::TcpListener, task::JoinHandle};

pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(transformer: Arc<dyn TransformPort>, scratch_root: &Path) -> Self {
        let scratch: Arc<dyn ScratchSpacePort> =
            Arc::new(TempScratchSpaceProvider::new(Some(scratch_root.to_path_buf())));
        let usecase: Arc<dyn CleanFileUseCase> =
            Arc::new(CleanFileUseCaseImpl::new(scratch, transformer));
        let app = build_router(AppState::new(usecase), &ServerConfig::default());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            serve(listener, app).await.expect("server run");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            handle,
        }
    }

    pub async fn upload(&self, file_name: &str, content: &[u8]) -> Response {
        let part = multipart::Part::bytes(content.to_vec()).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        self.post_form(form).await
    }

    pub async fn post_form(&self, form: multipart::Form) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, CLEAN_ROUTE))
            .multipart(form)
            .send()
            .await
            .expect("send request")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Runs `script` through `sh -c`, so `$1` is the input path and `$2` the output path.
pub fn sh_transformer(script: &str) -> Arc<dyn TransformPort> {
    Arc::new(ProcessTransformer::new(
        "sh",
        vec!["-c".to_string(), script.to_string(), "mock-clean".to_string()],
    ))
}

pub fn sh_transformer_with_timeout(script: &str, timeout: Duration) -> Arc<dyn TransformPort> {
    Arc::new(
        ProcessTransformer::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "mock-clean".to_string()],
        )
        .with_timeout(timeout),
    )
}

pub fn scratch_entries(root: &Path) -> usize {
    std::fs::read_dir(root).map(|dir| dir.count()).unwrap_or(0)
}
