use serde::Serialize;

use super::{EntryId, ListingView, Role};
use crate::models::PointFeature;

/// One entry of an in-memory listing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryEntry {
    pub name: String,
    pub element_id: Option<String>,
    pub link_id: Option<String>,
    /// `None` when the entry has no distance label element
    pub distance_label: Option<String>,
    pub distance: Option<f64>,
    pub active: bool,
    pub revealed: bool,
    #[serde(skip)]
    has_label: bool,
}

impl MemoryEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            distance_label: Some(String::new()),
            has_label: true,
            ..Default::default()
        }
    }

    /// An entry whose markup has no distance label element
    pub fn without_label(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Listing held in memory, standing in for the rendered page
#[derive(Debug, Clone, Default)]
pub struct MemoryListing {
    entries: Vec<MemoryEntry>,
    order: Vec<EntryId>,
}

impl MemoryListing {
    pub fn new(entries: Vec<MemoryEntry>) -> Self {
        let order = (0..entries.len()).collect();
        Self { entries, order }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            names
                .into_iter()
                .map(|n| MemoryEntry::new(n.as_ref()))
                .collect(),
        )
    }

    /// One entry per point, in store order, as the page would render it
    pub fn from_points(points: &[PointFeature]) -> Self {
        Self::from_names(points.iter().map(|p| p.name.as_str()))
    }

    pub fn entry(&self, entry: EntryId) -> Option<&MemoryEntry> {
        self.entries.get(entry)
    }

    /// Entries in display order
    pub fn ordered(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.order.iter().filter_map(|&i| self.entries.get(i))
    }

    pub fn active(&self) -> Option<EntryId> {
        self.order.iter().copied().find(|&i| self.entries[i].active)
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntryId> {
        self.order
            .iter()
            .copied()
            .find(|&i| self.entries[i].name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ListingView for MemoryListing {
    fn entries(&self) -> Vec<EntryId> {
        self.order.clone()
    }

    fn role_text(&self, entry: EntryId, role: Role) -> Option<String> {
        let e = self.entries.get(entry)?;
        match role {
            Role::Name | Role::Link => Some(e.name.clone()),
            Role::DistanceLabel => e.distance_label.clone(),
        }
    }

    fn set_role_text(&mut self, entry: EntryId, role: Role, text: &str) -> bool {
        let Some(e) = self.entries.get_mut(entry) else {
            return false;
        };
        match role {
            Role::DistanceLabel if e.has_label => {
                e.distance_label = Some(text.to_string());
                true
            }
            Role::Name | Role::Link => {
                e.name = text.to_string();
                true
            }
            Role::DistanceLabel => false,
        }
    }

    fn role_id(&self, entry: EntryId, role: Role) -> Option<String> {
        match role {
            Role::Link => self.entries.get(entry)?.link_id.clone(),
            Role::Name | Role::DistanceLabel => None,
        }
    }

    fn set_role_id(&mut self, entry: EntryId, role: Role, id: &str) -> bool {
        match (self.entries.get_mut(entry), role) {
            (Some(e), Role::Link) => {
                e.link_id = Some(id.to_string());
                true
            }
            _ => false,
        }
    }

    fn set_entry_id(&mut self, entry: EntryId, id: &str) {
        if let Some(e) = self.entries.get_mut(entry) {
            e.element_id = Some(id.to_string());
        }
    }

    fn distance(&self, entry: EntryId) -> Option<f64> {
        self.entries.get(entry)?.distance
    }

    fn set_distance(&mut self, entry: EntryId, miles: f64) {
        if let Some(e) = self.entries.get_mut(entry) {
            e.distance = Some(miles);
        }
    }

    fn clear_distance(&mut self, entry: EntryId) {
        if let Some(e) = self.entries.get_mut(entry) {
            e.distance = None;
            if e.has_label {
                e.distance_label = Some(String::new());
            }
        }
    }

    fn clear_ids(&mut self, entry: EntryId) {
        if let Some(e) = self.entries.get_mut(entry) {
            e.element_id = None;
            e.link_id = None;
        }
    }

    fn reorder(&mut self, order: &[EntryId]) {
        debug_assert_eq!(order.len(), self.entries.len());
        self.order = order.to_vec();
    }

    fn clear_active(&mut self) {
        for e in &mut self.entries {
            e.active = false;
        }
    }

    fn set_active(&mut self, entry: EntryId) {
        if let Some(e) = self.entries.get_mut(entry) {
            e.active = true;
        }
    }

    fn reveal(&mut self, name: &str) {
        for e in self.entries.iter_mut().filter(|e| e.name == name) {
            e.revealed = true;
        }
    }
}
