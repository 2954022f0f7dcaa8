//! Subcommand handlers.

use std::str::FromStr as _;
use std::sync::Arc;

use anyhow::Result;

use arbiter_core::{FileHandlingMode, GatewayConfig, Mode, TaskRequest};
use arbiter_gateway::RequestOrchestrator;
use arbiter_memory::InMemoryStore;
use arbiter_providers::ProviderRegistry;
use arbiter_routing::{ModelCatalog, RestrictionPolicy};

use crate::cli::Commands;
use crate::server;

/// Components assembled once at startup and threaded through request
/// handling.
pub struct Gateway {
    catalog: Arc<ModelCatalog>,
    policy: Arc<RestrictionPolicy>,
    orchestrator: Arc<RequestOrchestrator>,
}

impl Gateway {
    /// Builds the gateway from the on-disk configuration, environment
    /// restrictions, and an optional `models.toml` catalog override
    /// next to the config file.
    pub fn from_config() -> Result<Self> {
        let config = Arc::new(GatewayConfig::load_or_create()?);

        let catalog_path = GatewayConfig::config_dir()?.join("models.toml");
        let catalog = if catalog_path.exists() {
            ModelCatalog::load_from_file(&catalog_path)?
        } else {
            ModelCatalog::with_defaults()
        };
        let catalog = Arc::new(catalog);
        let policy = Arc::new(RestrictionPolicy::from_env());
        let registry = Arc::new(ProviderRegistry::from_config(&config));

        let orchestrator = Arc::new(RequestOrchestrator::new(
            Arc::clone(&config),
            Arc::clone(&catalog),
            Arc::clone(&policy),
            Arc::new(InMemoryStore::new()),
            registry,
        ));
        Ok(Self {
            catalog,
            policy,
            orchestrator,
        })
    }

    /// Dispatches a parsed subcommand.
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Ask {
                prompt,
                files,
                mode,
                model,
                thread,
                temperature,
                output,
                file_mode,
                json,
            } => {
                let request = TaskRequest {
                    mode: Mode::from_str(&mode)?,
                    prompt,
                    files,
                    model: Some(model),
                    temperature,
                    continuation_id: thread,
                    file_handling_mode: FileHandlingMode::from_str(&file_mode)?,
                    output_file: output,
                };
                self.handle_ask(request, json).await
            }
            Commands::Models => {
                self.handle_models();
                Ok(())
            }
            Commands::Serve => server::run(Arc::clone(&self.orchestrator)).await,
        }
    }

    #[allow(clippy::print_stdout, reason = "Command output")]
    async fn handle_ask(&self, request: TaskRequest, json: bool) -> Result<()> {
        let outcome = self.orchestrator.execute(request).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            println!("{}", outcome.text);
        }
        Ok(())
    }

    #[allow(clippy::print_stdout, reason = "Command output")]
    fn handle_models(&self) {
        println!("{:<20} {:<12} {:>12}  {:<10} status", "model", "provider", "context", "cost");
        for descriptor in self.catalog.iter() {
            let status = if self.policy.is_allowed(&descriptor.name) {
                "allowed"
            } else {
                "restricted"
            };
            println!(
                "{:<20} {:<12} {:>12}  {:<10} {status}",
                descriptor.name,
                descriptor.provider.key_name(),
                descriptor.context_limit,
                format!("{:?}", descriptor.cost).to_lowercase(),
            );
        }
    }
}
