//! Keeps the listing consistent with the feature store.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

use super::{EntryId, ListingView, Role};
use crate::geodesy::Geodesy;
use crate::models::{PointFeature, Position};
use crate::render::{Flight, MapRenderer};
use crate::session::FeatureStore;

pub const LISTING_PREFIX: &str = "listing-";
pub const LINK_PREFIX: &str = "link-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindReport {
    pub bound: usize,
    /// Entries whose name matched no feature
    pub unmatched: usize,
    /// Entries with no name element
    pub unnamed: usize,
}

/// Label shown on a listing entry: the distance rounded to two decimals
pub fn distance_label(miles: f64) -> String {
    let rounded = (miles * 100.0).round() / 100.0;
    format!("{} MILES AWAY", rounded)
}

/// Match every listing entry to a point by exact name and write the
/// point's ids and distance onto it.
///
/// When several features share a name, an entry keeps the feature it was
/// bound to by an earlier pass if that feature still carries its name.
/// The remaining entries take the first feature of their name not yet
/// claimed, falling back to the first one once all are claimed. Entries
/// that match nothing lose the ids and distance of any earlier binding.
pub fn bind<L: ListingView>(points: &[PointFeature], listing: &mut L) -> BindReport {
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, point) in points.iter().enumerate() {
        by_name.entry(point.name.as_str()).or_default().push(i);
    }

    let mut report = BindReport::default();
    let mut matched: Vec<(EntryId, &[usize])> = Vec::new();

    for entry in listing.entries() {
        let Some(name) = listing.role_text(entry, Role::Name) else {
            report.unnamed += 1;
            listing.clear_ids(entry);
            listing.clear_distance(entry);
            continue;
        };
        match by_name.get(name.as_str()) {
            Some(candidates) => {
                if candidates.len() > 1 {
                    debug!("{} features share the name {:?}", candidates.len(), name);
                }
                matched.push((entry, candidates.as_slice()));
            }
            None => {
                debug!("No feature named {:?} for listing entry {}", name, entry);
                report.unmatched += 1;
                listing.clear_ids(entry);
                listing.clear_distance(entry);
            }
        }
    }

    // Keep earlier bindings first so a second pass never swaps features
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut assigned: HashMap<EntryId, usize> = HashMap::new();
    for &(entry, candidates) in &matched {
        let previous = listing
            .role_id(entry, Role::Link)
            .and_then(|link| link.strip_prefix(LINK_PREFIX)?.parse::<usize>().ok());
        let kept = previous.and_then(|id| candidates.iter().copied().find(|&i| points[i].id == id));
        if let Some(index) = kept.filter(|&i| claimed.insert(i)) {
            assigned.insert(entry, index);
        }
    }

    for (entry, candidates) in matched {
        let index = match assigned.get(&entry) {
            Some(&index) => index,
            None => {
                let free = candidates.iter().copied().find(|i| !claimed.contains(i));
                let index = free.unwrap_or(candidates[0]);
                claimed.insert(index);
                index
            }
        };

        let feature = &points[index];
        listing.set_entry_id(entry, &format!("{}{}", LISTING_PREFIX, feature.id));
        listing.set_role_id(entry, Role::Link, &format!("{}{}", LINK_PREFIX, feature.id));

        match feature.distance {
            Some(miles) => {
                listing.set_role_text(entry, Role::DistanceLabel, &distance_label(miles));
                listing.set_distance(entry, miles);
            }
            None => listing.clear_distance(entry),
        }
        report.bound += 1;
    }

    report
}

/// Recompute distances from `search`, refresh the listing, sort it nearest
/// first and activate the nearest entry.
///
/// Returns false and changes nothing when the store holds no points.
pub fn resort<L, G>(store: &mut FeatureStore, listing: &mut L, geodesy: &G, search: Position) -> bool
where
    L: ListingView,
    G: Geodesy + ?Sized,
{
    if store.is_empty() {
        debug!("Ignoring search result, no projects loaded");
        return false;
    }

    store.set_distances(|point| geodesy.miles_between(search, point.position()));
    bind(store.points(), listing);

    let mut order = listing.entries();
    order.sort_by(|a, b| {
        let a = listing.distance(*a).unwrap_or(f64::INFINITY);
        let b = listing.distance(*b).unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });
    listing.reorder(&order);
    bind(store.points(), listing);

    listing.clear_active();
    if let Some(&nearest) = order.first() {
        listing.set_active(nearest);
    }

    true
}

/// Listing entry clicked: activate it, fly to its project and show the
/// single popup there. Returns the selected feature id, or `None` if the
/// entry is not bound to a feature.
pub fn select<L, R>(
    store: &FeatureStore,
    listing: &mut L,
    renderer: &mut R,
    entry: EntryId,
    zoom: f64,
) -> Option<usize>
where
    L: ListingView,
    R: MapRenderer,
{
    let link = listing.role_id(entry, Role::Link)?;
    let Some(feature) = link
        .strip_prefix(LINK_PREFIX)
        .and_then(|id| id.parse::<usize>().ok())
        .and_then(|id| store.point(id))
    else {
        warn!("Listing link {:?} does not refer to a loaded project", link);
        return None;
    };

    listing.clear_active();
    listing.set_active(entry);

    renderer.fly_to(Flight {
        center: feature.position(),
        zoom,
        speed: None,
    });
    renderer.close_popups();
    renderer.open_popup(feature.position());

    Some(feature.id)
}

/// Marker clicked: make it the only highlighted pin, reveal the project's
/// cards and show the single popup. Returns false for an unknown id.
pub fn select_marker<L, R>(store: &FeatureStore, listing: &mut L, renderer: &mut R, id: usize) -> bool
where
    L: ListingView,
    R: MapRenderer,
{
    let Some(feature) = store.point(id) else {
        return false;
    };
    debug!("Marker {} clicked ({})", id, feature.name);

    renderer.highlight_marker(&feature.marker_id());
    listing.reveal(&feature.name);
    renderer.close_popups();
    renderer.open_popup(feature.position());
    true
}
