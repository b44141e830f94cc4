//! Sensor identity registry.
//!
//! Owns the mapping from physical bus slot to persisted logical ID and the
//! derived sorted row projection used by the status table and the selection
//! workflow. Constructed once at startup with the bus and storage drivers
//! injected; lives for the process lifetime.
//!
//! Logical IDs are lazily loaded from storage on first query per slot and
//! cached in RAM. The cache is updated on every write whether or not the
//! persisted write verifies, so the in-memory value stays authoritative for
//! the session even on flaky storage.

use crate::error::VerifyError;
use crate::sensor::{IdStore, SensorAddress, SensorBus, SensorRecord, MAX_SENSORS};

/// Registry of sensor slots, their persisted logical IDs, and the sorted
/// presentation snapshot.
///
/// `refresh_snapshot()` must be called before any presentation or selection
/// operation; connectivity is only trusted for the current scan.
#[derive(Debug)]
pub struct SensorRegistry<B: SensorBus, S: IdStore> {
    bus: B,
    store: S,

    /// Raw stored byte per slot, lazily loaded.
    ids: [Option<u8>; MAX_SENSORS],

    /// Physical-order records from the latest `refresh_snapshot()`.
    records: [SensorRecord; MAX_SENSORS],

    /// Derived projection: connected rows ascending by logical ID, then
    /// vacant rows ascending by physical index. Always `MAX_SENSORS` long.
    sorted: [SensorRecord; MAX_SENSORS],

    device_count: usize,
}

impl<B: SensorBus, S: IdStore> SensorRegistry<B, S> {
    /// Create a registry over the given drivers. No bus traffic happens
    /// until the first `refresh_snapshot()`.
    pub fn new(bus: B, store: S) -> Self {
        let mut records = [SensorRecord::default(); MAX_SENSORS];
        for (i, rec) in records.iter_mut().enumerate() {
            *rec = SensorRecord::vacant(i);
        }
        Self {
            bus,
            store,
            ids: [None; MAX_SENSORS],
            records,
            sorted: records,
            device_count: 0,
        }
    }

    /// Number of devices found by the latest scan.
    pub fn device_count(&self) -> usize {
        self.device_count
    }

    /// Physical-order records from the latest snapshot.
    pub fn records(&self) -> &[SensorRecord; MAX_SENSORS] {
        &self.records
    }

    /// Sorted presentation rows from the latest snapshot.
    pub fn sorted_rows(&self) -> &[SensorRecord; MAX_SENSORS] {
        &self.sorted
    }

    /// Mutable access to the bus driver (composition root / tests).
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Mutable access to the storage driver (composition root / tests).
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn effective_id(raw: u8, slot: usize) -> u8 {
        if (1..=MAX_SENSORS as u8).contains(&raw) {
            raw
        } else {
            slot as u8 + 1
        }
    }

    fn raw_id(&mut self, slot: usize) -> u8 {
        debug_assert!(slot < MAX_SENSORS);
        if let Some(cached) = self.ids[slot] {
            return cached;
        }
        let raw = self.store.read_byte(slot);
        self.ids[slot] = Some(raw);
        raw
    }

    /// Effective logical ID for `slot`: the stored byte when it is inside
    /// 1..=MAX_SENSORS, otherwise `slot + 1`. Never fails, never mutates
    /// storage.
    pub fn logical_id(&mut self, slot: usize) -> u8 {
        let raw = self.raw_id(slot);
        Self::effective_id(raw, slot)
    }

    /// Persist a new logical ID for `slot` and verify it by reading back.
    ///
    /// The RAM cache and the current snapshot are updated before the write
    /// is attempted; a [`VerifyError`] reports a read-back mismatch but the
    /// in-memory value remains authoritative. Storage is best-effort and a
    /// failed write must not derail the workflow.
    pub fn set_logical_id(&mut self, slot: usize, new_id: u8) -> Result<(), VerifyError> {
        debug_assert!(slot < MAX_SENSORS);
        self.ids[slot] = Some(new_id);
        if self.records[slot].connected {
            self.records[slot].raw_id = new_id;
            self.records[slot].logical_id = Self::effective_id(new_id, slot);
            self.rebuild_sorted();
        }

        self.store.write_byte(slot, new_id);
        self.store.commit();
        let readback = self.store.read_byte(slot);
        if readback != new_id {
            return Err(VerifyError {
                slot,
                expected: new_id,
                actual: readback,
            });
        }
        Ok(())
    }

    /// Whether `candidate` is already used by a connected slot other than
    /// `exclude_slot`. O(N) over the live device count, N <= MAX_SENSORS.
    pub fn is_id_duplicated(&mut self, candidate: u8, exclude_slot: usize) -> bool {
        for i in 0..self.device_count {
            if i == exclude_slot || !self.records[i].connected {
                continue;
            }
            if self.logical_id(i) == candidate {
                return true;
            }
        }
        false
    }

    /// Re-assign logical IDs 1..=count to all connected slots in ascending
    /// hardware-address order. Returns `(assigned, verify_failures)`.
    ///
    /// Address order is reproducible across reboots, unlike bus scan order,
    /// so this yields a canonical numbering. Operates on the current
    /// snapshot; call `refresh_snapshot()` first.
    pub fn assign_ids_by_address(&mut self) -> (usize, usize) {
        let mut slots: heapless::Vec<(SensorAddress, usize), MAX_SENSORS> = heapless::Vec::new();
        for rec in self.records.iter() {
            if rec.connected {
                let _ = slots.push((rec.address, rec.physical_index));
            }
        }
        slots.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut failures = 0;
        for (j, (_, slot)) in slots.iter().enumerate() {
            if self.set_logical_id(*slot, j as u8 + 1).is_err() {
                failures += 1;
            }
        }
        (slots.len(), failures)
    }

    /// Re-assign every connected slot its default ID (`physical_index + 1`).
    /// Returns `(assigned, verify_failures)`.
    pub fn reset_ids_to_default(&mut self) -> (usize, usize) {
        let mut assigned = 0;
        let mut failures = 0;
        for i in 0..MAX_SENSORS {
            if !self.records[i].connected {
                continue;
            }
            assigned += 1;
            if self.set_logical_id(i, i as u8 + 1).is_err() {
                failures += 1;
            }
        }
        (assigned, failures)
    }

    /// Re-scan the bus and rebuild all records plus the sorted projection.
    ///
    /// Zero discovered devices is not an error; it yields an all-vacant
    /// snapshot.
    pub fn refresh_snapshot(&mut self) {
        let count = self.bus.rescan().min(MAX_SENSORS);
        self.device_count = count;

        for i in 0..MAX_SENSORS {
            let record = if i < count {
                match self.bus.address(i) {
                    Some(address) => {
                        let temperature_c = self.bus.temperature_c(i);
                        let raw_id = self.raw_id(i);
                        SensorRecord {
                            physical_index: i,
                            address,
                            logical_id: Self::effective_id(raw_id, i),
                            raw_id,
                            connected: true,
                            temperature_c,
                        }
                    }
                    None => SensorRecord::vacant(i),
                }
            } else {
                SensorRecord::vacant(i)
            };
            self.records[i] = record;
        }
        self.rebuild_sorted();
    }

    fn rebuild_sorted(&mut self) {
        self.sorted = self.records;
        self.sorted.sort_unstable_by(|a, b| {
            b.connected.cmp(&a.connected).then_with(|| {
                if a.connected {
                    a.logical_id.cmp(&b.logical_id)
                } else {
                    a.physical_index.cmp(&b.physical_index)
                }
            })
        });
    }
}
