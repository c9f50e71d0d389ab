use std::sync::{Mutex, MutexGuard};

use crate::config::NUM_TIME_SLOTS;
use crate::domain::airport::slot::{Booking, PlaneId, TimeSlot};
use crate::error::{Error, Result};

/// The timeline of one gate. Only reachable through [`Gate::lock`], so every operation below runs
/// with the gate's guard held.
#[derive(Debug, Clone)]
pub struct SlotTable {
    slots: [TimeSlot; NUM_TIME_SLOTS],
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotTable {
    pub fn new() -> Self {
        SlotTable { slots: [TimeSlot::default(); NUM_TIME_SLOTS] }
    }

    pub fn slot(&self, index: usize) -> Option<&TimeSlot> {
        self.slots.get(index)
    }

    /// `true` iff every slot in the inclusive range `[start, end]` is unoccupied.
    ///
    /// Callers keep `start <= end < NUM_TIME_SLOTS`.
    pub fn is_range_free(&self, start: usize, end: usize) -> bool {
        debug_assert!(start <= end && end < NUM_TIME_SLOTS, "slot range [{}, {}] out of bounds", start, end);
        self.slots[start..=end].iter().all(|slot| !slot.is_occupied())
    }

    /// Books `[start, end]` for `plane_id`.
    ///
    /// The whole range is verified before the first write, so a conflict leaves the table
    /// unchanged.
    pub fn commit(&mut self, plane_id: PlaneId, start: usize, end: usize) -> Result<()> {
        debug_assert!(start <= end && end < NUM_TIME_SLOTS, "slot range [{}, {}] out of bounds", start, end);

        if let Some(offset) = self.slots[start..=end].iter().position(|slot| slot.is_occupied()) {
            let index = start + offset;
            return Err(Error::SlotConflict { index, plane_id: self.slots[index].plane_id() });
        }

        let booking = Booking { plane_id, range_start: start, range_end: end };
        for slot in &mut self.slots[start..=end] {
            slot.occupy(booking);
        }
        Ok(())
    }

    /// Earliest start in `[earliest, latest_start]` whose `duration` slots are all free.
    pub fn first_free_start(&self, earliest: usize, latest_start: usize, duration: usize) -> Option<usize> {
        if duration == 0 {
            return None;
        }
        (earliest..=latest_start)
            .take_while(|start| start + duration <= NUM_TIME_SLOTS)
            .find(|&start| self.is_range_free(start, start + duration - 1))
    }

    /// Locates the booking of `plane_id`.
    ///
    /// Foreign bookings are skipped in one step via their stored end, so the scan costs one step
    /// per booking or free slot rather than one per slot.
    ///
    /// # Returns
    /// The index the booking starts at and its inclusive end.
    pub fn find_plane(&self, plane_id: PlaneId) -> Option<(usize, usize)> {
        let mut index = 0;
        while index < NUM_TIME_SLOTS {
            match self.slots[index].booking() {
                None => index += 1,
                Some(booking) if booking.plane_id == plane_id => return Some((index, booking.range_end)),
                Some(booking) => index = booking.range_end + 1,
            }
        }
        None
    }
}

/// A gate: one slot table behind its own mutex.
#[derive(Debug, Default)]
pub struct Gate {
    table: Mutex<SlotTable>,
}

impl Gate {
    pub fn new() -> Self {
        Gate { table: Mutex::new(SlotTable::new()) }
    }

    /// Acquires this gate's guard.
    ///
    /// Commits never panic halfway through a write, so a poisoned table is still consistent and
    /// is recovered.
    pub fn lock(&self) -> MutexGuard<'_, SlotTable> {
        match self.table.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Gate mutex was poisoned. Recovering slot table.");
                poisoned.into_inner()
            }
        }
    }
}
