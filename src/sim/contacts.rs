//! Contact ledger
//!
//! Persistent set of overlapping pairs held in a fixed-capacity slab. Raw
//! per-step overlap results go in; Enter / Continue / Exit lifecycle events
//! come out, each transition exactly once.
//!
//! Per step:
//! 1. `begin_step` clears every contact's `confirmed` flag
//! 2. `confirm` is called for each overlapping pair; a pair without a contact
//!    gets one (Enter), an existing contact is just re-confirmed
//! 3. `end_step` emits Continue for every confirmed contact and Exit for the
//!    rest, freeing their slots

use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::settings::CapacityPolicy;

/// Where a live contact is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPhase {
    /// Created this step, not yet re-confirmed
    New,
    /// Re-confirmed on at least one later step
    Established,
}

/// A tracked overlapping pair, stored with `first < second`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub first: EntityId,
    pub second: EntityId,
    pub confirmed: bool,
    pub alive: bool,
    /// Steps survived since creation
    pub age: u32,
}

impl Contact {
    pub fn phase(&self) -> ContactPhase {
        if self.age == 0 {
            ContactPhase::New
        } else {
            ContactPhase::Established
        }
    }

    pub fn involves(&self, id: EntityId) -> bool {
        self.first == id || self.second == id
    }

    fn matches(&self, first: EntityId, second: EntityId) -> bool {
        self.first == first && self.second == second
    }
}

/// Lifecycle event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactEventKind {
    Enter,
    Continue,
    Exit,
}

/// Lifecycle event for a pair; delivered to both entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub kind: ContactEventKind,
    pub first: EntityId,
    pub second: EntityId,
}

impl ContactEvent {
    pub fn involves(&self, id: EntityId) -> bool {
        self.first == id || self.second == id
    }
}

/// Outcome of reporting an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Contact already existed
    Reconfirmed,
    /// New contact created
    Entered,
    /// New contact created past nominal capacity (`CapacityPolicy::Grow`)
    EnteredOverCapacity,
    /// Slab full, contact not created (`CapacityPolicy::Reject`)
    Rejected,
}

#[derive(Debug, Clone)]
pub struct ContactLedger {
    slots: Vec<Option<Contact>>,
    capacity: usize,
    policy: CapacityPolicy,
}

/// Canonical `(low, high)` ordering of a pair
#[inline]
fn ordered(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl ContactLedger {
    pub fn new(capacity: usize, policy: CapacityPolicy) -> Self {
        Self {
            slots: vec![None; capacity],
            capacity,
            policy,
        }
    }

    /// Nominal slab size
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live contacts in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn get(&self, a: EntityId, b: EntityId) -> Option<&Contact> {
        let (first, second) = ordered(a, b);
        self.iter().find(|c| c.matches(first, second))
    }

    pub fn contains(&self, a: EntityId, b: EntityId) -> bool {
        self.get(a, b).is_some()
    }

    /// Clear every `confirmed` flag and age surviving contacts
    pub fn begin_step(&mut self) {
        for contact in self.slots.iter_mut().flatten() {
            contact.confirmed = false;
            contact.age = contact.age.saturating_add(1);
        }
    }

    /// Record that `a` and `b` overlap this step
    pub fn confirm(&mut self, a: EntityId, b: EntityId) -> Confirmation {
        let (first, second) = ordered(a, b);

        if let Some(contact) = self
            .slots
            .iter_mut()
            .flatten()
            .find(|c| c.matches(first, second))
        {
            contact.confirmed = true;
            return Confirmation::Reconfirmed;
        }

        let contact = Contact {
            first,
            second,
            confirmed: true,
            alive: true,
            age: 0,
        };

        if let Some(slot) = self.slots.iter_mut().find(|s| s.is_none()) {
            *slot = Some(contact);
            return Confirmation::Entered;
        }

        match self.policy {
            CapacityPolicy::Grow => {
                log::warn!(
                    "Contact slab full ({}); growing for pair ({}, {})",
                    self.capacity,
                    first,
                    second
                );
                self.slots.push(Some(contact));
                Confirmation::EnteredOverCapacity
            }
            CapacityPolicy::Reject => {
                log::warn!(
                    "Contact slab full ({}); rejecting pair ({}, {})",
                    self.capacity,
                    first,
                    second
                );
                Confirmation::Rejected
            }
        }
    }

    /// Close the step: Continue for confirmed contacts, Exit (and removal) for
    /// the rest
    pub fn end_step(&mut self) -> Vec<ContactEvent> {
        let mut events = Vec::new();
        for slot in &mut self.slots {
            let Some(contact) = slot else {
                continue;
            };
            if contact.confirmed {
                events.push(ContactEvent {
                    kind: ContactEventKind::Continue,
                    first: contact.first,
                    second: contact.second,
                });
            } else {
                contact.alive = false;
                events.push(ContactEvent {
                    kind: ContactEventKind::Exit,
                    first: contact.first,
                    second: contact.second,
                });
                *slot = None;
            }
        }
        self.shrink();
        events
    }

    /// Drop every contact involving `id` (the entity is despawning), returning
    /// one Exit per removed contact
    pub fn release(&mut self, id: EntityId) -> Vec<ContactEvent> {
        let mut events = Vec::new();
        for slot in &mut self.slots {
            let Some(contact) = slot else {
                continue;
            };
            if contact.involves(id) {
                events.push(ContactEvent {
                    kind: ContactEventKind::Exit,
                    first: contact.first,
                    second: contact.second,
                });
                *slot = None;
            }
        }
        self.shrink();
        events
    }

    /// Give back empty slots grown past nominal capacity
    fn shrink(&mut self) {
        while self.slots.len() > self.capacity && matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
    }
}
