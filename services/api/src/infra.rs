use metrics_exporter_prometheus::PrometheusHandle;
use property_desk::catalog::PropertyRepository;
use property_desk::leads::InquiryRepository;
use property_desk::visits::VisitRepository;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// A backend that can hold every record kind the site stores.
pub(crate) trait SiteStore: PropertyRepository + InquiryRepository + VisitRepository {}

impl<T> SiteStore for T where T: PropertyRepository + InquiryRepository + VisitRepository {}
