//! Reusable entity storage.
//!
//! A [`Pool`] is an ordered arena of slots. Acquiring writes a fully-built value into the first
//! inactive slot, only appending when every slot is in use, so sustained fire settles into a fixed
//! footprint instead of churning allocations. Pools never shrink.
//!
//! Reuse is first-fit in slot order; gameplay (hit resolution in particular) depends on this order
//! being stable.

/// An entity that can live in a [`Pool`].
pub trait Poolable {
    fn is_active(&self) -> bool;
    fn deactivate(&mut self);
}

#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: Poolable> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` in the first inactive slot, or a new slot if none is free, and returns its index.
    ///
    /// The whole slot is overwritten, so nothing from the previous occupant survives.
    pub fn acquire(&mut self, value: T) -> usize {
        match self.slots.iter().position(|slot| !slot.is_active()) {
            Some(index) => {
                self.slots[index] = value;
                index
            }
            None => {
                self.slots.push(value);
                self.slots.len() - 1
            }
        }
    }

    pub fn release(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.deactivate();
        }
    }

    pub fn release_all(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.deactivate();
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// All slots, active or not, in slot order.
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|slot| slot.is_active())
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|slot| slot.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    pub fn any_active(&self) -> bool {
        self.slots.iter().any(|slot| slot.is_active())
    }

    /// Number of slots ever allocated, i.e. the high-water mark of simultaneously active entities.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
