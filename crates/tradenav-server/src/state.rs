//! Application state shared across requests

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;
use tradenav_classifiers::HsCodeClassifier;

use crate::config::ServiceConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServiceConfig>,

    /// The classification cascade
    pub classifier: Arc<HsCodeClassifier>,

    /// Prometheus metrics handle for rendering; absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Initialize application state from configuration
    pub fn new(config: ServiceConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        info!("Initializing application state");

        let classifier = HsCodeClassifier::from_config(&config.classifier)?;
        info!(
            "Classifier ready: {} categories, tiers {:?}",
            classifier.tables().len(),
            classifier.tier_names()
        );

        Ok(Self::with_classifier(config, classifier, metrics_handle))
    }

    /// State around an already-built classifier
    pub fn with_classifier(
        config: ServiceConfig,
        classifier: HsCodeClassifier,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            classifier: Arc::new(classifier),
            metrics_handle,
        }
    }
}
