// ── Published entity state ──
//
// Each collection is an `Arc<Vec<_>>` behind an `ArcSwap`. Refreshes
// publish a new vector; nothing mutates a vector once published, so a
// reader holding an earlier `Arc` keeps a consistent (if stale) view.

use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::convert::Projection;
use crate::model::{Attributes, Device, Flap, Hub, Pet, attr};
use crate::timeline::{self, TimelineBatch};

pub(crate) struct EntityStore {
    raw: ArcSwapOption<Value>,
    hubs: ArcSwap<Vec<Hub>>,
    flaps: ArcSwap<Vec<Flap>>,
    pets: ArcSwap<Vec<Pet>>,
    last_refresh: ArcSwapOption<DateTime<Utc>>,
}

impl EntityStore {
    pub(crate) fn new() -> Self {
        Self {
            raw: ArcSwapOption::empty(),
            hubs: ArcSwap::from_pointee(Vec::new()),
            flaps: ArcSwap::from_pointee(Vec::new()),
            pets: ArcSwap::from_pointee(Vec::new()),
            last_refresh: ArcSwapOption::empty(),
        }
    }

    pub(crate) fn raw(&self) -> Option<Arc<Value>> {
        self.raw.load_full()
    }

    pub(crate) fn hubs(&self) -> Arc<Vec<Hub>> {
        self.hubs.load_full()
    }

    pub(crate) fn flaps(&self) -> Arc<Vec<Flap>> {
        self.flaps.load_full()
    }

    pub(crate) fn pets(&self) -> Arc<Vec<Pet>> {
        self.pets.load_full()
    }

    pub(crate) fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh.load_full().map(|t| *t)
    }

    /// First entity with this id, searching hubs, then flaps, then pets.
    pub(crate) fn device(&self, id: i64) -> Option<Device> {
        if let Some(hub) = self.hubs.load().iter().find(|h| h.id == id) {
            return Some(Device::Hub(hub.clone()));
        }
        if let Some(flap) = self.flaps.load().iter().find(|f| f.id == id) {
            return Some(Device::Flap(flap.clone()));
        }
        self.pets
            .load()
            .iter()
            .find(|p| p.id == id)
            .map(|p| Device::Pet(p.clone()))
    }

    /// Publish a freshly projected snapshot.
    ///
    /// Timeline-derived attributes already learned for an entity are
    /// carried over to its new record, so a rebuild never forgets them.
    /// Pets and flaps are published through `rcu`, so attributes set by a
    /// concurrent timeline pass are carried over as well.
    pub(crate) fn apply_snapshot(&self, raw: Arc<Value>, projection: Projection) {
        let Projection { hubs, flaps, pets } = projection;

        self.pets.rcu(|current| {
            let mut next = pets.clone();
            for pet in &mut next {
                if let Some(old) = current.iter().find(|p| p.id == pet.id) {
                    carry_timeline_attributes(&old.attributes, &mut pet.attributes);
                }
            }
            next
        });
        self.flaps.rcu(|current| {
            let mut next = flaps.clone();
            for flap in &mut next {
                if let Some(old) = current.iter().find(|f| f.id == flap.id) {
                    carry_timeline_attributes(&old.attributes, &mut flap.attributes);
                }
            }
            next
        });

        self.hubs.store(Arc::new(hubs));
        self.raw.store(Some(raw));
        self.last_refresh.store(Some(Arc::new(Utc::now())));
    }

    /// Fold a batch of timeline events into pet and flap attributes.
    ///
    /// Uses read-copy-update against whatever collection is current, so it
    /// composes with a concurrent `apply_snapshot`. Returns the number of
    /// attributes set.
    pub(crate) fn reconcile(&self, batch: &TimelineBatch) -> usize {
        let mut applied = 0;
        self.pets.rcu(|current| {
            let mut pets = Vec::clone(current);
            applied = timeline::apply_movements(batch, &mut pets);
            pets
        });
        let mut lock_changes = 0;
        self.flaps.rcu(|current| {
            let mut flaps = Vec::clone(current);
            lock_changes = timeline::apply_lock_changes(batch, &mut flaps);
            flaps
        });
        applied + lock_changes
    }
}

fn carry_timeline_attributes(old: &Attributes, new: &mut Attributes) {
    for key in attr::TIMELINE {
        if let Some(value) = old.get(key) {
            new.entry(key.to_owned()).or_insert_with(|| value.clone());
        }
    }
}
