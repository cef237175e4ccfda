use std::{sync::Arc, time::Duration};

use anyhow::Error;
use axum::Router;
use clean_application::{CleanFileUseCase, CleanFileUseCaseImpl};
use clean_configuration::{AppConfig, ServerConfig, TransformBackend, TransformConfig};
use clean_domain::{ScratchSpacePort, TransformPort};
use clean_http_server::{build_router, create_app_routes, AppState};
use clean_infra::{ProcessTransformer, TempScratchSpaceProvider};
use clean_infra_native::NativeCsvCleaner;

pub async fn build_and_run(config: AppConfig, server_config: ServerConfig) -> Result<(), Error> {
    let app = Application::new(config).await?;
    app.run(server_config).await
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self, Error> {
        config.check()?;

        let scratch_provider = TempScratchSpaceProvider::new(config.scratch.root.clone());
        let scratch_root = scratch_provider.root();
        tracing::info!(
            backend = ?config.transform.backend,
            scratch_root = %scratch_root.display(),
            timeout_ms = config.transform.timeout_ms,
            "initializing clean application"
        );

        let scratch: Arc<dyn ScratchSpacePort> = Arc::new(scratch_provider);
        let transformer = build_transformer(&config.transform);
        let usecase: Arc<dyn CleanFileUseCase> =
            Arc::new(CleanFileUseCaseImpl::new(scratch, transformer));

        Ok(Self {
            config,
            state: AppState::new(usecase),
        })
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config.server)
    }

    pub async fn run(self, server_config: ServerConfig) -> Result<(), Error> {
        tracing::info!(
            host = %server_config.host,
            port = server_config.port,
            "starting clean HTTP server"
        );

        create_app_routes(self.state, server_config)
            .await
            .map_err(|err| anyhow::anyhow!("server startup failed: {err}"))
    }
}

fn build_transformer(config: &TransformConfig) -> Arc<dyn TransformPort> {
    match config.backend {
        TransformBackend::Native => Arc::new(NativeCsvCleaner::new()),
        TransformBackend::Process => {
            tracing::info!(
                program = %config.program,
                args = ?config.args,
                working_dir = ?config.working_dir,
                "using external transformation process"
            );
            Arc::new(
                ProcessTransformer::new(config.program.clone(), config.args.clone())
                    .with_timeout(Duration::from_millis(config.timeout_ms))
                    .with_working_dir(config.working_dir.clone())
                    .with_max_diagnostic_bytes(config.max_diagnostic_bytes),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_backend_is_the_default() {
        let transformer = build_transformer(&TransformConfig::default());
        assert_eq!(transformer.name(), "native");
    }

    #[test]
    fn process_backend_uses_the_configured_program() {
        let config = TransformConfig {
            backend: TransformBackend::Process,
            program: "sh".to_string(),
            ..TransformConfig::default()
        };
        assert_eq!(build_transformer(&config).name(), "process");
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.transform.backend = TransformBackend::Process;
        config.transform.program = String::new();

        assert!(Application::new(config).await.is_err());
    }

    #[tokio::test]
    async fn application_uses_configured_scratch_root() {
        let root = tempfile::TempDir::new().expect("root");
        let mut config = AppConfig::default();
        config.scratch.root = Some(root.path().to_path_buf());

        let app = Application::new(config).await.expect("application");
        assert_eq!(app.config.scratch.root.as_deref(), Some(root.path()));
        let _router = app.router();
    }
}
