use omnipos_store_service::config::load_config;
use omnipos_store_service::service::StoreServiceApp;
use omnipos_store_service::tracing::init_tracing_from_config;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = load_config(None);
    let app_config = loaded.config;
    init_tracing_from_config(Some(&app_config.logging), app_config.log_format());

    // 日志就绪前产生的配置告警
    for warning in &loaded.warnings {
        warn!("{warning}");
    }

    info!(
        service = %app_config.service.name,
        environment = %app_config.service.environment,
        "Loaded configuration"
    );

    let app = StoreServiceApp::new(&app_config).await?;
    app.run().await
}
