use std::fmt;

use crate::config::SLOT_MINUTES;

pub type PlaneId = i64;

/// A contiguous run of slots reserved for one plane.
///
/// Every slot of the run stores the same inclusive bounds, so a scan that lands on any slot of
/// the booking can jump straight past its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub plane_id: PlaneId,
    pub range_start: usize,
    pub range_end: usize,
}

/// One cell of a gate's timeline. A free slot carries no booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeSlot {
    booking: Option<Booking>,
}

impl TimeSlot {
    pub fn is_occupied(&self) -> bool {
        self.booking.is_some()
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    /// Plane holding the slot, `0` for a free slot.
    pub fn plane_id(&self) -> PlaneId {
        self.booking.map_or(0, |b| b.plane_id)
    }

    /// Marks the slot as part of `booking`.
    ///
    /// # Returns
    /// `false` if the slot was already occupied; it is left untouched in that case.
    pub fn occupy(&mut self, booking: Booking) -> bool {
        if self.booking.is_some() {
            return false;
        }
        self.booking = Some(booking);
        true
    }
}

/// Clock time at which a slot index begins, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotTime(pub usize);

impl SlotTime {
    pub fn hour(&self) -> usize {
        self.0 * SLOT_MINUTES / 60
    }

    pub fn minute(&self) -> usize {
        self.0 * SLOT_MINUTES % 60
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}
