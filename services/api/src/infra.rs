use metrics_exporter_prometheus::PrometheusHandle;
use sira::config::AppConfig;
use sira::contact::{ContactRelay, EntraTokenClient, GraphMailClient};
use sira::listings::{JustimmoClient, ListingAggregator};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SiteAggregator = ListingAggregator<JustimmoClient>;
pub(crate) type SiteRelay = ContactRelay<EntraTokenClient, GraphMailClient>;

pub(crate) fn listing_aggregator(config: &AppConfig) -> Arc<SiteAggregator> {
    let client = JustimmoClient::new(&config.justimmo);
    Arc::new(ListingAggregator::new(Arc::new(client)))
}

pub(crate) fn contact_relay(config: &AppConfig) -> Arc<SiteRelay> {
    let tokens = EntraTokenClient::new(&config.mail);
    let transport = GraphMailClient::new(&config.mail);
    Arc::new(ContactRelay::new(
        Arc::new(tokens),
        Arc::new(transport),
        config.mail.recipient.clone(),
    ))
}
