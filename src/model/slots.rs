use super::{DockItem, DockItemId};

/// Capacity-bounded map from slot index to occupant.
///
/// Entries are kept in recency order: the first entry is the slot touched
/// longest ago. [`SlotMap::replace`] keeps an existing slot's position while
/// [`SlotMap::touch`] moves it to the most recent end. Capacity is small (a
/// handful of dock slots), so a vector scan is the whole data structure.
#[derive(Debug, Clone)]
pub struct SlotMap {
    capacity: usize,
    entries: Vec<(usize, DockItem)>,
}

impl SlotMap {
    pub fn new(capacity: usize) -> Self { Self { capacity, entries: Vec::with_capacity(capacity) } }

    pub fn capacity(&self) -> usize { self.capacity }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn is_full(&self) -> bool { self.entries.len() >= self.capacity }

    pub fn in_bounds(&self, index: usize) -> bool { index < self.capacity }

    pub fn get(&self, index: usize) -> Option<&DockItem> {
        self.entries.iter().find(|(i, _)| *i == index).map(|(_, item)| item)
    }

    pub fn contains(&self, index: usize) -> bool { self.get(index).is_some() }

    /// Sets the occupant of `index`. An occupied slot keeps its recency
    /// position; an empty one becomes the most recent.
    pub fn replace(&mut self, index: usize, item: DockItem) -> Option<DockItem> {
        assert!(self.in_bounds(index), "slot {index} outside capacity {}", self.capacity);
        match self.entries.iter_mut().find(|(i, _)| *i == index) {
            Some((_, slot)) => Some(std::mem::replace(slot, item)),
            None => {
                self.entries.push((index, item));
                None
            }
        }
    }

    /// Sets the occupant of `index` and marks the slot most recently touched.
    pub fn touch(&mut self, index: usize, item: DockItem) -> Option<DockItem> {
        assert!(self.in_bounds(index), "slot {index} outside capacity {}", self.capacity);
        let previous = self.remove(index);
        self.entries.push((index, item));
        previous
    }

    pub fn remove(&mut self, index: usize) -> Option<DockItem> {
        let pos = self.entries.iter().position(|(i, _)| *i == index)?;
        Some(self.entries.remove(pos).1)
    }

    /// Drops every entry `keep` rejects and returns the cleared indices.
    pub fn retain(&mut self, mut keep: impl FnMut(usize, &DockItem) -> bool) -> Vec<usize> {
        let mut cleared = Vec::new();
        self.entries.retain(|(index, item)| {
            let kept = keep(*index, item);
            if !kept {
                cleared.push(*index);
            }
            kept
        });
        cleared
    }

    /// Entries from least to most recently touched.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &DockItem)> {
        self.entries.iter().map(|(index, item)| (*index, item))
    }

    /// Rewrites every occupant in place without changing recency.
    pub fn update_all(&mut self, mut f: impl FnMut(&DockItem) -> DockItem) {
        for (_, item) in self.entries.iter_mut() {
            *item = f(item);
        }
    }

    pub fn index_of_id(&self, id: DockItemId) -> Option<usize> {
        self.iter().find(|(_, item)| item.id == id).map(|(index, _)| index)
    }

    pub fn contains_id(&self, id: &DockItemId) -> bool { self.iter().any(|(_, item)| item.id == *id) }

    pub fn index_of_package(&self, package: &str) -> Option<usize> {
        self.iter().find(|(_, item)| item.package() == package).map(|(index, _)| index)
    }

    pub fn least_recent_dynamic(&self) -> Option<usize> {
        self.iter().find(|(_, item)| item.is_dynamic()).map(|(index, _)| index)
    }

    pub fn lowest_free_index(&self) -> Option<usize> { (0..self.capacity).find(|i| !self.contains(*i)) }

    /// Lowest index that is empty or holds a dynamic item.
    pub fn lowest_replaceable_index(&self) -> Option<usize> {
        (0..self.capacity).find(|i| self.get(*i).is_none_or(DockItem::is_dynamic))
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> { self.entries.iter().map(|(_, item)| item.package()) }

    /// Occupants in slot order, skipping empty slots.
    pub fn to_dense(&self) -> Vec<DockItem> {
        (0..self.capacity).filter_map(|index| self.get(index).cloned()).collect()
    }
}
