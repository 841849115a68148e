//! Map session: owns the feature store and drives the renderer and the
//! listing.
//!
//! A session is single-threaded. Event callbacks (load, geocoder result,
//! clicks) run on one task and share state through `RefCell`, and no
//! borrow is held across an await point.

mod store;

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::MapConfig;
use crate::geodesy::{Geodesy, HaversineMiles};
use crate::listing::{self, BindReport, EntryId, ListingView};
use crate::models::Position;
use crate::render::{LineLayer, MapRenderer, Marker, PLACES_SOURCE};
use crate::source::DataSource;

pub use store::FeatureStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows: usize,
    pub points: usize,
    pub lines: usize,
    /// False when the fetch failed and the map was drawn empty
    pub fetched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(LoadReport),
    /// Another load was still in flight
    Skipped,
}

/// Clears the busy flag when the load finishes or is dropped
struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct Session<S, R, L> {
    source: S,
    config: MapConfig,
    geodesy: Box<dyn Geodesy>,
    store: RefCell<FeatureStore>,
    renderer: RefCell<R>,
    listing: RefCell<L>,
    drawn_layers: RefCell<Vec<String>>,
    busy: Cell<bool>,
    shutdown: watch::Sender<bool>,
}

impl<S, R, L> Session<S, R, L>
where
    S: DataSource,
    R: MapRenderer,
    L: ListingView,
{
    pub fn new(source: S, renderer: R, listing: L, config: MapConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            source,
            config,
            geodesy: Box::new(HaversineMiles),
            store: RefCell::new(FeatureStore::default()),
            renderer: RefCell::new(renderer),
            listing: RefCell::new(listing),
            drawn_layers: RefCell::new(Vec::new()),
            busy: Cell::new(false),
            shutdown,
        }
    }

    pub fn with_geodesy<G: Geodesy + 'static>(mut self, geodesy: G) -> Self {
        self.geodesy = Box::new(geodesy);
        self
    }

    /// Fetch, transform, replace the store and redraw.
    ///
    /// A failed fetch is logged and treated as an empty table, so the map
    /// always ends up drawn. Returns `Skipped` if a load is already running.
    pub async fn load(&self) -> LoadOutcome {
        if self.busy.replace(true) {
            warn!("Load requested while another load is in flight, skipping");
            return LoadOutcome::Skipped;
        }
        let _busy = BusyGuard(&self.busy);

        let (rows, fetched) = match self.source.fetch_rows().await {
            Ok(rows) => (rows, true),
            Err(e) => {
                error!("Error fetching project data: {}", e);
                (Vec::new(), false)
            }
        };

        let store = FeatureStore::from_rows(&rows);
        let report = LoadReport {
            rows: rows.len(),
            points: store.points().len(),
            lines: store.lines().len(),
            fetched,
        };
        *self.store.borrow_mut() = store;

        self.redraw();
        info!(
            "Loaded {} rows: {} points, {} routes",
            report.rows, report.points, report.lines
        );
        LoadOutcome::Loaded(report)
    }

    /// Draw the current store: point source, one line layer per route,
    /// markers, then bind the listing.
    fn redraw(&self) {
        let store = self.store.borrow();
        let mut renderer = self.renderer.borrow_mut();
        let mut drawn = self.drawn_layers.borrow_mut();

        for layer_id in drawn.drain(..) {
            renderer.remove_layer(&layer_id);
        }

        renderer.set_point_source(PLACES_SOURCE, &store.points_collection());

        for (index, line) in store.lines().iter().enumerate() {
            let id = format!("route-{}", index);
            renderer.add_line_layer(LineLayer {
                id: id.clone(),
                feature: line.to_feature(),
                style: self.config.route_style.clone(),
            });
            drawn.push(id);
        }

        renderer.clear_markers();
        for point in store.points() {
            renderer.place_marker(Marker {
                id: point.marker_id(),
                position: point.position(),
            });
        }

        listing::bind(store.points(), &mut *self.listing.borrow_mut());
    }

    /// Re-bind the listing to the current store
    pub fn bind(&self) -> BindReport {
        listing::bind(self.store.borrow().points(), &mut *self.listing.borrow_mut())
    }

    /// Geocoder result: sort the listing by distance from `search`.
    /// No-op (returns false) while the store is empty.
    pub fn resort(&self, search: Position) -> bool {
        if !self.config.geocoder.contains(search) {
            debug!("Search result {:?} lies outside the geocoder bounds", search);
        }
        listing::resort(
            &mut self.store.borrow_mut(),
            &mut *self.listing.borrow_mut(),
            self.geodesy.as_ref(),
            search,
        )
    }

    /// Listing entry clicked
    pub fn select(&self, entry: EntryId) -> Option<usize> {
        listing::select(
            &self.store.borrow(),
            &mut *self.listing.borrow_mut(),
            &mut *self.renderer.borrow_mut(),
            entry,
            self.config.selection.zoom,
        )
    }

    /// Map marker clicked
    pub fn select_marker(&self, id: usize) -> bool {
        listing::select_marker(
            &self.store.borrow(),
            &mut *self.listing.borrow_mut(),
            &mut *self.renderer.borrow_mut(),
            id,
        )
    }

    /// Wait the configured delay, then fly to the default region.
    ///
    /// Returns false without flying if the session is torn down first.
    pub async fn fly_to_default_region(&self) -> bool {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return false;
        }

        let region = &self.config.default_region;
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(region.delay_ms)) => {
                self.renderer.borrow_mut().fly_to(region.flight());
                true
            }
            _ = shutdown.wait_for(|down| *down) => {
                debug!("Session torn down, default flight cancelled");
                false
            }
        }
    }

    /// End the session, cancelling any pending scheduled flight
    pub fn teardown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_loading(&self) -> bool {
        self.busy.get()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn store(&self) -> Ref<'_, FeatureStore> {
        self.store.borrow()
    }

    pub fn renderer(&self) -> Ref<'_, R> {
        self.renderer.borrow()
    }

    pub fn listing(&self) -> Ref<'_, L> {
        self.listing.borrow()
    }

    pub fn listing_mut(&self) -> RefMut<'_, L> {
        self.listing.borrow_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::MemoryListing;
    use crate::models::Row;
    use crate::render::{RecordingRenderer, RenderCommand};
    use crate::source::{FetchError, StaticSource};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct FailingSource;

    impl DataSource for FailingSource {
        async fn fetch_rows(&self) -> Result<Vec<Row>, FetchError> {
            Err(FetchError::Payload("connection reset".to_string()))
        }
    }

    /// Holds the fetch until the gate opens
    struct GatedSource {
        gate: Notify,
        calls: AtomicUsize,
        rows: Vec<Row>,
    }

    impl DataSource for GatedSource {
        async fn fetch_rows(&self) -> Result<Vec<Row>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(self.rows.clone())
        }
    }

    fn rows(value: serde_json::Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    fn session<S: DataSource>(source: S, names: &[&str]) -> Session<S, RecordingRenderer, MemoryListing> {
        Session::new(
            source,
            RecordingRenderer::new(),
            MemoryListing::from_names(names),
            MapConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_load_reindexes_points() {
        let source = StaticSource::new(rows(json!([
            {"Name": "A", "Start Latitude": "1", "Start Longitude": "2"},
            {"Name": "B", "Coordinates Array": "[[1,2],[3,4]]"},
            {"Name": "C", "Start Latitude": "5", "Start Longitude": "6"},
        ])));
        let session = session(source, &["C", "A"]);

        let outcome = session.load().await;
        assert_eq!(
            outcome,
            LoadOutcome::Loaded(LoadReport {
                rows: 3,
                points: 2,
                lines: 1,
                fetched: true
            })
        );

        let ids: Vec<_> = session.store().points().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1]);

        let listing = session.listing();
        assert_eq!(listing.entry(0).unwrap().element_id.as_deref(), Some("listing-1"));
        assert_eq!(listing.entry(1).unwrap().element_id.as_deref(), Some("listing-0"));
    }

    #[tokio::test]
    async fn test_load_draws_sources_layers_and_markers() {
        let source = StaticSource::new(rows(json!([
            {"Name": "A", "Start Latitude": "1", "Start Longitude": "2", "Coordinates Array": "[[2,1],[3,1]]"},
            {"Coordinates Array": "[[5,5],[6,6]]"},
        ])));
        let session = session(source, &[]);
        session.load().await;

        let renderer = session.renderer();
        assert_eq!(renderer.point_source.as_ref().unwrap().len(), 1);
        assert_eq!(renderer.layer_ids(), vec!["route-0", "route-1"]);
        assert_eq!(renderer.layers[0].style.color, "#ffbd70");
        assert_eq!(renderer.markers.len(), 1);
        assert_eq!(renderer.markers[0].id, "marker-0");
    }

    #[tokio::test]
    async fn test_reload_replaces_layers() {
        let source = StaticSource::new(rows(json!([
            {"Coordinates Array": "[[5,5],[6,6]]"},
        ])));
        let session = session(source, &[]);
        session.load().await;
        session.load().await;

        let renderer = session.renderer();
        assert_eq!(renderer.layer_ids(), vec!["route-0"]);
        assert!(renderer.commands.contains(&RenderCommand::RemoveLayer {
            layer_id: "route-0".to_string()
        }));
    }

    #[tokio::test]
    async fn test_failed_fetch_renders_empty_map() {
        let session = session(FailingSource, &["A"]);

        let outcome = session.load().await;
        assert_eq!(
            outcome,
            LoadOutcome::Loaded(LoadReport {
                rows: 0,
                points: 0,
                lines: 0,
                fetched: false
            })
        );
        assert!(session.store().points().is_empty());
        assert!(session.store().lines().is_empty());
        assert_eq!(session.renderer().point_source.as_ref().unwrap().len(), 0);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_overlapping_load_is_skipped() {
        let source = GatedSource {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
            rows: rows(json!([{"Name": "A", "Start Latitude": "1", "Start Longitude": "2"}])),
        };
        let session = session(source, &["A"]);

        let (first, (second, resorted)) = tokio::join!(session.load(), async {
            let second = session.load().await;
            let resorted = session.resort([2.0, 1.0]);
            session.source.gate.notify_one();
            (second, resorted)
        });

        assert!(matches!(first, LoadOutcome::Loaded(_)));
        assert_eq!(second, LoadOutcome::Skipped);
        assert!(!resorted);
        assert_eq!(session.source.calls.load(Ordering::SeqCst), 1);
        assert!(!session.is_loading());
        assert_eq!(session.store().points().len(), 1);
    }

    #[tokio::test]
    async fn test_resort_and_select_through_session() {
        let session = session(StaticSource::builtin(), &[]);
        session.load().await;

        // One entry per point, so every name appears twice
        let listing = MemoryListing::from_points(session.store().points());
        *session.listing_mut() = listing;
        session.bind();

        // Miami
        assert!(session.resort([-80.1918, 25.7617]));
        {
            let listing = session.listing();
            let distances: Vec<f64> = listing.ordered().map(|e| e.distance.unwrap()).collect();
            assert!(distances.windows(2).all(|w| w[0] <= w[1]), "{:?}", distances);
        }

        let nearest_feature = session
            .store()
            .points()
            .iter()
            .min_by(|a, b| a.distance.unwrap().total_cmp(&b.distance.unwrap()))
            .map(|p| p.id)
            .unwrap();
        let nearest = session.listing().active().unwrap();
        assert_eq!(
            session.listing().entry(nearest).unwrap().link_id,
            Some(format!("link-{}", nearest_feature))
        );

        let selected = session.select(nearest).unwrap();
        assert_eq!(selected, nearest_feature);
        let renderer = session.renderer();
        assert_eq!(renderer.popups.len(), 1);
        assert_eq!(
            renderer.camera.unwrap().center,
            session.store().point(selected).unwrap().position()
        );
    }

    /// Distance is the longitude difference, to make orderings obvious
    struct LongitudeGap;

    impl Geodesy for LongitudeGap {
        fn miles_between(&self, from: Position, to: Position) -> f64 {
            (from[0] - to[0]).abs()
        }
    }

    #[tokio::test]
    async fn test_resort_uses_injected_geodesy() {
        let source = StaticSource::new(rows(json!([
            {"Name": "far", "Start Latitude": "0", "Start Longitude": "10"},
            {"Name": "near", "Start Latitude": "1", "Start Longitude": "3"},
        ])));
        let session = session(source, &["far", "near"]).with_geodesy(LongitudeGap);
        session.load().await;

        assert!(session.resort([0.0, 0.0]));
        let listing = session.listing();
        let labels: Vec<_> = listing
            .ordered()
            .map(|e| (e.name.as_str(), e.distance_label.as_deref().unwrap()))
            .collect();
        assert_eq!(
            labels,
            vec![("near", "3 MILES AWAY"), ("far", "10 MILES AWAY")]
        );
    }

    #[tokio::test]
    async fn test_default_flight_fires_after_delay() {
        let mut config = MapConfig::default();
        config.default_region.delay_ms = 10;
        let session = Session::new(
            StaticSource::default(),
            RecordingRenderer::new(),
            MemoryListing::default(),
            config,
        );

        assert!(session.fly_to_default_region().await);
        let camera = session.renderer().camera.unwrap();
        assert_eq!(camera.center, [-81.5158, 27.7663]);
        assert_eq!(camera.zoom, 6.0);
        assert_eq!(camera.speed, Some(0.5));
    }

    #[tokio::test]
    async fn test_teardown_cancels_default_flight() {
        let mut config = MapConfig::default();
        config.default_region.delay_ms = 60_000;
        let session = Session::new(
            StaticSource::default(),
            RecordingRenderer::new(),
            MemoryListing::default(),
            config,
        );

        let (flew, _) = tokio::join!(session.fly_to_default_region(), async {
            tokio::task::yield_now().await;
            session.teardown();
        });

        assert!(!flew);
        assert!(session.renderer().camera.is_none());
        assert!(!session.fly_to_default_region().await);
    }
}
