//! Identity registry for suite and spec records.
//!
//! The runner re-delivers the same suite or spec identity across lifecycle
//! events, each time with a partial snapshot. The registry keeps exactly one
//! record per identity, merging each new snapshot onto the accumulated
//! record in place, and preserves first-seen order for listing.

use std::collections::HashMap;

use crate::records::{SpecEvent, SpecRecord, SuiteEvent, SuiteRecord};

/// One reporter instance's record store
#[derive(Debug, Default)]
pub struct Registry {
    suites: Vec<SuiteRecord>,
    suite_index: HashMap<String, usize>,
    specs: Vec<SpecRecord>,
    spec_index: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a suite event into its record, creating the record on first
    /// sight. The event's description overwrites; accumulated fields
    /// (children, timestamps) are untouched.
    pub fn upsert_suite(&mut self, event: &SuiteEvent) -> &mut SuiteRecord {
        let index = match self.suite_index.get(&event.id) {
            Some(&i) => {
                self.suites[i].description = event.description.clone();
                i
            }
            None => {
                self.suites.push(SuiteRecord::from_event(event));
                let i = self.suites.len() - 1;
                self.suite_index.insert(event.id.clone(), i);
                i
            }
        };
        &mut self.suites[index]
    }

    /// Merge a spec event into its record, creating the record on first
    /// sight. The event's description overwrites; a status overwrites only
    /// when the event carries one.
    pub fn upsert_spec(&mut self, event: &SpecEvent) -> &mut SpecRecord {
        let index = match self.spec_index.get(&event.id) {
            Some(&i) => {
                let record = &mut self.specs[i];
                record.description = event.description.clone();
                if let Some(status) = event.status {
                    record.status = Some(status);
                }
                i
            }
            None => {
                self.specs.push(SpecRecord::from_event(event));
                let i = self.specs.len() - 1;
                self.spec_index.insert(event.id.clone(), i);
                i
            }
        };
        &mut self.specs[index]
    }

    /// Look up a suite by id
    pub fn suite(&self, id: &str) -> Option<&SuiteRecord> {
        self.suite_index.get(id).map(|&i| &self.suites[i])
    }

    /// Look up a suite by id, mutably
    pub fn suite_mut(&mut self, id: &str) -> Option<&mut SuiteRecord> {
        self.suite_index.get(id).map(|&i| &mut self.suites[i])
    }

    /// Look up a spec by id
    pub fn spec(&self, id: &str) -> Option<&SpecRecord> {
        self.spec_index.get(id).map(|&i| &self.specs[i])
    }

    /// Look up a spec by id, mutably
    pub fn spec_mut(&mut self, id: &str) -> Option<&mut SpecRecord> {
        self.spec_index.get(id).map(|&i| &mut self.specs[i])
    }

    /// All suites in first-seen order
    pub fn suites(&self) -> &[SuiteRecord] {
        &self.suites
    }

    /// All specs in first-seen order
    pub fn specs(&self) -> &[SpecRecord] {
        &self.specs
    }
}
