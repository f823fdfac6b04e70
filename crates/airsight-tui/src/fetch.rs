//! Per-panel request lifecycle.
//!
//! Each panel derives an [`Endpoint`] from the selection. When the derived
//! endpoint changes, the in-flight request is aborted and the generation
//! advances; responses from older generations are dropped on arrival.

use crate::events::AppEvent;
use airsight_client::{Endpoint, Gateway};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Every data-driven panel of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    AirlineInfo,
    KeyData,
    RatingDistribution,
    SubItemScoring,
    ReviewWordcloud,
    TopRated,
    CityDistribution,
    FeatureImportance,
    Reviews,
}

impl PanelKind {
    pub fn title(&self) -> &'static str {
        match self {
            PanelKind::AirlineInfo => "Airline",
            PanelKind::KeyData => "Key Data",
            PanelKind::RatingDistribution => "Rating Distribution",
            PanelKind::SubItemScoring => "Sub-item Scoring",
            PanelKind::ReviewWordcloud => "Review Wordcloud",
            PanelKind::TopRated => "Top Rated Airlines",
            PanelKind::CityDistribution => "Flight Distribution",
            PanelKind::FeatureImportance => "Feature Importance",
            PanelKind::Reviews => "Reviews",
        }
    }

    /// Name used in the "no data" placeholder.
    pub fn data_label(&self) -> &'static str {
        match self {
            PanelKind::AirlineInfo => "airline",
            PanelKind::KeyData => "key",
            PanelKind::RatingDistribution => "rating distribution",
            PanelKind::SubItemScoring => "sub-item scoring",
            PanelKind::ReviewWordcloud => "wordcloud",
            PanelKind::TopRated => "top rated",
            PanelKind::CityDistribution => "distribution",
            PanelKind::FeatureImportance => "feature importance",
            PanelKind::Reviews => "review",
        }
    }

    /// Whether the panel only has something to show once an airline is
    /// selected.
    pub fn needs_selection(&self) -> bool {
        !matches!(self, PanelKind::TopRated)
    }

    /// Request for the given selection, if any.
    pub fn endpoint(&self, airline: Option<&str>) -> Option<Endpoint> {
        if !self.needs_selection() {
            return Some(Endpoint::TopRated);
        }
        let name = airline?.to_string();
        Some(match self {
            PanelKind::AirlineInfo => Endpoint::AirlineInfo(name),
            PanelKind::KeyData => Endpoint::KeyData(name),
            PanelKind::RatingDistribution => Endpoint::RatingDistribution(name),
            PanelKind::SubItemScoring => Endpoint::SubItemScoring(name),
            PanelKind::ReviewWordcloud => Endpoint::WordcloudData(name),
            PanelKind::CityDistribution => Endpoint::CityDistribution(name),
            PanelKind::FeatureImportance => Endpoint::FeatureImportance(name),
            PanelKind::Reviews => Endpoint::Reviews(name),
            PanelKind::TopRated => Endpoint::TopRated,
        })
    }
}

/// A successful response that carries nothing to draw.
pub fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Result of pointing a slot at a (possibly new) endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotChange {
    /// Same endpoint as before; nothing was sent
    Unchanged,
    /// No endpoint; any previous request was dropped
    Cleared,
    /// A request for this generation is in flight
    Started(u64),
}

/// Request bookkeeping for one panel.
#[derive(Debug)]
pub struct FetchSlot {
    kind: PanelKind,
    endpoint: Option<Endpoint>,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl FetchSlot {
    pub fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            endpoint: None,
            generation: 0,
            handle: None,
        }
    }

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.handle.is_some()
    }

    /// Point the slot at `endpoint`, starting a request when it changed.
    pub fn sync(
        &mut self,
        endpoint: Option<Endpoint>,
        gateway: &Arc<dyn Gateway>,
        sender: &mpsc::UnboundedSender<AppEvent>,
    ) -> SlotChange {
        if endpoint == self.endpoint {
            return SlotChange::Unchanged;
        }
        self.abort();
        self.generation += 1;
        self.endpoint = endpoint.clone();

        let Some(endpoint) = endpoint else {
            trace!(panel = ?self.kind, "No request without a selection");
            return SlotChange::Cleared;
        };

        let generation = self.generation;
        let panel = self.kind;
        let gateway = Arc::clone(gateway);
        let sender = sender.clone();
        debug!(panel = ?panel, path = %endpoint, generation, "Fetching panel data");
        self.handle = Some(tokio::spawn(async move {
            let result = gateway.get(&endpoint).await.map_err(|e| e.toast_message());
            // The loop may already be gone on shutdown
            let _ = sender.send(AppEvent::Fetched {
                panel,
                generation,
                result,
            });
        }));
        SlotChange::Started(generation)
    }

    /// Accept a response. False when it belongs to an older request.
    pub fn accept(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.endpoint.is_none() {
            debug!(panel = ?self.kind, generation, current = self.generation, "Dropping stale response");
            return false;
        }
        self.handle = None;
        true
    }

    /// Abort the in-flight request and forget the endpoint, so the next
    /// sync always fetches again.
    pub fn reset(&mut self) {
        self.abort();
        self.generation += 1;
        self.endpoint = None;
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            trace!(panel = ?self.kind, generation = self.generation, "Aborted request");
        }
    }
}

impl Drop for FetchSlot {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airsight_client::MockGateway;
    use serde_json::json;
    use std::time::Duration;

    fn channel() -> (
        mpsc::UnboundedSender<AppEvent>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn test_endpoints_follow_selection() {
        assert_eq!(PanelKind::KeyData.endpoint(None), None);
        assert_eq!(
            PanelKind::ReviewWordcloud.endpoint(Some("KLM")),
            Some(Endpoint::WordcloudData("KLM".to_string()))
        );
        assert_eq!(PanelKind::TopRated.endpoint(None), Some(Endpoint::TopRated));
    }

    #[test]
    fn test_empty_payloads() {
        assert!(is_empty_payload(&Value::Null));
        assert!(is_empty_payload(&json!([])));
        assert!(is_empty_payload(&json!({})));
        assert!(!is_empty_payload(&json!([1])));
        assert!(!is_empty_payload(&json!({"a": 1})));
        assert!(!is_empty_payload(&json!(0)));
    }

    #[tokio::test]
    async fn test_no_selection_issues_no_request() {
        let mock = MockGateway::new();
        let gateway: Arc<dyn Gateway> = Arc::new(mock.clone());
        let (tx, _rx) = channel();
        let mut slot = FetchSlot::new(PanelKind::KeyData);

        assert_eq!(slot.sync(None, &gateway, &tx), SlotChange::Unchanged);
        tokio::task::yield_now().await;
        assert_eq!(mock.call_count(), 0);
        assert!(!slot.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_reports_generation() {
        let endpoint = Endpoint::KeyData("KLM".to_string());
        let mock = MockGateway::new().with_data(endpoint.clone(), json!({"x": 1}));
        let gateway: Arc<dyn Gateway> = Arc::new(mock.clone());
        let (tx, mut rx) = channel();
        let mut slot = FetchSlot::new(PanelKind::KeyData);

        assert_eq!(
            slot.sync(Some(endpoint.clone()), &gateway, &tx),
            SlotChange::Started(1)
        );
        assert_eq!(slot.sync(Some(endpoint), &gateway, &tx), SlotChange::Unchanged);

        match rx.recv().await {
            Some(AppEvent::Fetched {
                panel,
                generation,
                result,
            }) => {
                assert_eq!(panel, PanelKind::KeyData);
                assert!(slot.accept(generation));
                assert_eq!(result, Ok(json!({"x": 1})));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(mock.call_count(), 1);
        assert!(!slot.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_changed_selection_aborts_and_drops_stale() {
        let first = Endpoint::Reviews("Slow Air".to_string());
        let second = Endpoint::Reviews("Fast Air".to_string());
        let mock = MockGateway::new()
            .with_data(first.clone(), json!(["slow"]))
            .with_data(second.clone(), json!(["fast"]));
        mock.set_delay(first.clone(), Duration::from_secs(5));
        let gateway: Arc<dyn Gateway> = Arc::new(mock.clone());
        let (tx, mut rx) = channel();
        let mut slot = FetchSlot::new(PanelKind::Reviews);

        assert_eq!(slot.sync(Some(first), &gateway, &tx), SlotChange::Started(1));
        tokio::task::yield_now().await;
        assert_eq!(slot.sync(Some(second), &gateway, &tx), SlotChange::Started(2));

        let event = rx.recv().await;
        assert!(matches!(
            event,
            Some(AppEvent::Fetched { generation: 2, ref result, .. }) if result == &Ok(json!(["fast"]))
        ));
        // A late answer for generation 1 would be refused
        assert!(!slot.accept(1));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_server_failure_suggests_retry() {
        let endpoint = Endpoint::TopRated;
        let mock = MockGateway::new();
        mock.set_status(endpoint.clone(), 503, "warming up");
        let gateway: Arc<dyn Gateway> = Arc::new(mock);
        let (tx, mut rx) = channel();
        let mut slot = FetchSlot::new(PanelKind::TopRated);

        slot.sync(Some(endpoint), &gateway, &tx);
        match rx.recv().await {
            Some(AppEvent::Fetched { result: Err(message), .. }) => {
                assert!(message.contains("503"));
                assert!(message.ends_with("(try again in a moment)"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clearing_selection_drops_in_flight() {
        let endpoint = Endpoint::KeyData("KLM".to_string());
        let mock = MockGateway::new().with_data(endpoint.clone(), json!({"x": 1}));
        let gateway: Arc<dyn Gateway> = Arc::new(mock);
        let (tx, _rx) = channel();
        let mut slot = FetchSlot::new(PanelKind::KeyData);

        slot.sync(Some(endpoint), &gateway, &tx);
        assert_eq!(slot.sync(None, &gateway, &tx), SlotChange::Cleared);
        assert!(!slot.is_loading());
        assert!(!slot.accept(1));
        assert!(!slot.accept(2));
    }

    #[tokio::test]
    async fn test_reset_forces_refetch() {
        let endpoint = Endpoint::TopRated;
        let mock = MockGateway::new().with_data(endpoint.clone(), json!([]));
        let gateway: Arc<dyn Gateway> = Arc::new(mock);
        let (tx, _rx) = channel();
        let mut slot = FetchSlot::new(PanelKind::TopRated);

        slot.sync(Some(endpoint.clone()), &gateway, &tx);
        slot.reset();
        assert_eq!(slot.sync(Some(endpoint), &gateway, &tx), SlotChange::Started(3));
    }
}
