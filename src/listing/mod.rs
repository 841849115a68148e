//! Listing shown beside the map and its synchronizer.
//!
//! The listing markup is rendered elsewhere. It is reached only through
//! [`ListingView`], which resolves each entry's parts by semantic
//! [`Role`] rather than by position in the markup.

mod memory;
mod sync;

pub use memory::{MemoryEntry, MemoryListing};
pub use sync::{
    bind, distance_label, resort, select, select_marker, BindReport, LINK_PREFIX, LISTING_PREFIX,
};

/// Stable handle of a listing entry; unaffected by reordering
pub type EntryId = usize;

/// Parts of a listing entry the synchronizer reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Element holding the project name
    Name,
    /// Clickable element that selects the project
    Link,
    /// Element showing "<n> MILES AWAY"
    DistanceLabel,
}

pub trait ListingView {
    /// Entries in display order
    fn entries(&self) -> Vec<EntryId>;

    /// Text content of a role element, if the entry has one
    fn role_text(&self, entry: EntryId, role: Role) -> Option<String>;

    /// Set the text of a role element; returns false if the entry has none
    fn set_role_text(&mut self, entry: EntryId, role: Role, text: &str) -> bool;

    /// Identifier written onto a role element by a previous bind
    fn role_id(&self, entry: EntryId, role: Role) -> Option<String>;

    /// Set the identifier of a role element; returns false if the entry has none
    fn set_role_id(&mut self, entry: EntryId, role: Role, id: &str) -> bool;

    /// Set the identifier of the entry element itself
    fn set_entry_id(&mut self, entry: EntryId, id: &str);

    /// Numeric distance attribute used for sorting
    fn distance(&self, entry: EntryId) -> Option<f64>;

    fn set_distance(&mut self, entry: EntryId, miles: f64);

    /// Remove the distance attribute and empty the distance label
    fn clear_distance(&mut self, entry: EntryId);

    /// Remove the identifiers written by a previous bind
    fn clear_ids(&mut self, entry: EntryId);

    /// Replace the display order. `order` holds every entry exactly once.
    fn reorder(&mut self, order: &[EntryId]);

    fn clear_active(&mut self);

    fn set_active(&mut self, entry: EntryId);

    /// Reveal the detail cards of the project called `name`
    fn reveal(&mut self, name: &str);
}
