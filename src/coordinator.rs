//! Failover coordinator
//!
//! Tries the connectors configured for a chain in order. Reachability and
//! existence failures (`Network`, `NotFound`) advance to the next connector;
//! anything else ends the lookup, so a parser defect on one provider is not
//! masked by another provider's answer. Connector order is exactly the
//! registration order.

use crate::config::AppConfig;
use crate::connectors::Connector;
use crate::errors::{ConnectorError, ConnectorResult, ProviderFailure};
use crate::registry::{self, ProviderKind};
use crate::types::{Chain, TransactionData};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct FailoverCoordinator {
    routes: BTreeMap<Chain, Vec<Arc<dyn Connector>>>,
    fail_over_on_malformed: bool,
}

impl FailoverCoordinator {
    pub fn new(fail_over_on_malformed: bool) -> Self {
        Self {
            routes: BTreeMap::new(),
            fail_over_on_malformed,
        }
    }

    /// Build every route from the configured (or default) provider orders
    pub fn from_config(config: &AppConfig) -> ConnectorResult<Self> {
        let mut coordinator = Self::new(config.lookup.fail_over_on_malformed);

        for chain in Chain::ALL {
            for provider in config.lookup.order_for(chain) {
                let connector = registry::build_connector(provider, chain, &config.providers)?;
                coordinator.register(connector);
            }
        }

        Ok(coordinator)
    }

    /// Append a connector to the route of the chain it was built for
    pub fn register(&mut self, connector: Arc<dyn Connector>) -> &mut Self {
        self.routes
            .entry(connector.chain())
            .or_default()
            .push(connector);
        self
    }

    /// Providers consulted for `chain`, in order
    pub fn providers_for(&self, chain: Chain) -> Vec<ProviderKind> {
        self.routes
            .get(&chain)
            .map(|connectors| connectors.iter().map(|c| c.provider()).collect())
            .unwrap_or_default()
    }

    pub async fn lookup(&self, txid: &str, chain: Chain) -> ConnectorResult<TransactionData> {
        if !chain.is_valid_txid(txid) {
            return Err(ConnectorError::InvalidTransactionId {
                chain,
                txid: txid.to_string(),
            });
        }

        let connectors = match self.routes.get(&chain) {
            Some(connectors) if !connectors.is_empty() => connectors,
            _ => return Err(ConnectorError::NoConnectors { chain }),
        };

        let mut failures = Vec::new();

        for connector in connectors {
            let provider = connector.provider();
            debug!("Looking up {} on {} via {}", txid, chain, provider);

            let error = match connector.get_transaction(txid).await {
                Ok(data) => {
                    info!("Resolved {} on {} via {}", txid, chain, provider);
                    return Ok(data);
                }
                Err(e) => e,
            };

            if !self.should_fail_over(&error) {
                debug!("{} failed with {}, not failing over", provider, error.kind());
                return Err(error);
            }

            warn!("{} failed for {}: {}", provider, txid, error);
            failures.push(ProviderFailure { provider, error });
        }

        error!(
            "All {} providers exhausted for {} on {}",
            failures.len(),
            txid,
            chain
        );
        Err(ConnectorError::AllProvidersExhausted { chain, failures })
    }

    fn should_fail_over(&self, error: &ConnectorError) -> bool {
        error.is_recoverable()
            || (self.fail_over_on_malformed
                && matches!(error, ConnectorError::MalformedResponse { .. }))
    }
}
