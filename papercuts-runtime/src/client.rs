use std::sync::Arc;

use anyhow::Context;
use papercuts_core::config::ClientConfig;
use papercuts_engine::traits::{DashboardApi, PdfApi};

use crate::dashboard::LiveDashboardApi;
use crate::live::LivePdfApi;
use crate::mock::{MockDashboardApi, MockLatency, MockPdfApi, MockRepository};

/// The API clients a front end needs, all in the same mode.
#[derive(Clone)]
pub struct ApiClients {
    pub pdf: Arc<dyn PdfApi>,
    pub dashboard: Arc<dyn DashboardApi>,
}

impl std::fmt::Debug for ApiClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cfg = self.pdf.config();
        f.debug_struct("ApiClients")
            .field("mode", &cfg.mode_label())
            .field("api_base", &cfg.api_base)
            .finish()
    }
}

/// Picks live or mock clients once, from `cfg`.
///
/// In mock mode both clients share one freshly seeded repository.
pub fn build_clients_from_config(cfg: ClientConfig) -> anyhow::Result<ApiClients> {
    build_clients_with_latency(cfg, MockLatency::default())
}

pub fn build_clients_with_latency(
    cfg: ClientConfig,
    latency: MockLatency,
) -> anyhow::Result<ApiClients> {
    if cfg.use_mock {
        log::info!("using mock backend");
        let repo = MockRepository::seeded();
        return Ok(ApiClients {
            pdf: Arc::new(MockPdfApi::new(cfg, repo.clone()).with_latency(latency)),
            dashboard: Arc::new(MockDashboardApi::new(repo).with_latency(latency)),
        });
    }

    log::info!("using backend at {}", cfg.api_base);
    let pdf = LivePdfApi::new(cfg).context("create HTTP client")?;
    let dashboard = LiveDashboardApi::new(pdf.transport().clone());
    Ok(ApiClients {
        pdf: Arc::new(pdf),
        dashboard: Arc::new(dashboard),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_follows_config() {
        let mock = build_clients_from_config(ClientConfig {
            use_mock: true,
            ..ClientConfig::default()
        })
        .unwrap();
        assert!(mock.pdf.config().use_mock);

        let live = build_clients_from_config(ClientConfig::default()).unwrap();
        assert_eq!(live.pdf.config().mode_label(), "live");
    }

    #[tokio::test]
    async fn mock_clients_share_one_repository() {
        let clients = build_clients_with_latency(
            ClientConfig {
                use_mock: true,
                ..ClientConfig::default()
            },
            MockLatency::NONE,
        )
        .unwrap();
        assert!(clients.pdf.check_health().await);
        let users = clients.dashboard.list_users().await.unwrap();
        assert_eq!(users.total, 2);
    }
}
