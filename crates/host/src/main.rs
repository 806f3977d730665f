//! Worker entry point.
//!
//! Wires the in-memory bus, instance store, and repositories together,
//! runs the orchestrator and guest provisioner, and drives one
//! demonstration onboarding so the wiring is observable in the logs.

mod config;

use std::time::Duration;

use accounts::{
    CreateUser, GuestProvisioner, InMemoryGuestRepository, InMemoryUserRepository,
    UserCreationHandler,
};
use messaging::InMemoryEventBus;
use saga::SagaOrchestrator;
use saga_store::InMemorySagaStore;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire the components
    let bus = InMemoryEventBus::with_capacity(config.bus_capacity);
    let store = InMemorySagaStore::with_retention(chrono::Duration::seconds(config.retention_secs));
    let users = InMemoryUserRepository::new();
    let guests = InMemoryGuestRepository::new();

    let orchestrator = SagaOrchestrator::new(bus.clone(), store.clone());
    let provisioner = GuestProvisioner::new(guests.clone(), bus.clone());

    // 4. Start the event pumps; subscriptions open before anything publishes
    let orchestrator_task = orchestrator
        .clone()
        .spawn()
        .await
        .expect("failed to subscribe orchestrator");
    let provisioner_task = provisioner
        .spawn()
        .await
        .expect("failed to subscribe guest provisioner");

    let handler = UserCreationHandler::new(users, bus);

    // 5. Drive one demonstration onboarding end to end
    let correlation_id = handler
        .create_user(CreateUser::new("Ada Lovelace", "ada@example.com"))
        .await
        .expect("demonstration user creation failed");

    let outcome = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(Some((instance, _))) = orchestrator.get_instance(correlation_id).await
                && instance.state().is_terminal()
            {
                return instance;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    match outcome {
        Ok(instance) => {
            tracing::info!(
                %correlation_id,
                state = %instance.state(),
                "demonstration onboarding finished"
            );
        }
        Err(_) => {
            tracing::warn!(%correlation_id, "demonstration onboarding did not finish in time");
        }
    }

    // 6. Run until asked to stop
    tracing::info!("worker running, press Ctrl-C to stop");
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");

    orchestrator_task.abort();
    provisioner_task.abort();

    tracing::debug!(metrics = %metrics_handle.render(), "final metrics");
    tracing::info!("worker shut down gracefully");
}
