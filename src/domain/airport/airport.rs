use crate::config::NUM_TIME_SLOTS;
use crate::domain::airport::gate::Gate;
use crate::domain::airport::slot::PlaneId;
use crate::domain::communication::protocol::RequestError;
use crate::error::{Error, Result};

/// Where a plane sits: gate plus the slot range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleResult {
    pub gate_number: usize,
    pub start_time: usize,
    pub end_time: usize,
}

/// One line of a gate dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStatus {
    pub index: usize,
    pub occupied: bool,
    pub plane_id: PlaneId,
}

/// The scheduling state of one airport node: a fixed set of gates, each with its own guard.
#[derive(Debug)]
pub struct Airport {
    id: usize,
    gates: Vec<Gate>,
}

impl Airport {
    pub fn new(id: usize, num_gates: usize) -> Result<Self> {
        if num_gates == 0 {
            return Err(Error::ConfigError(format!("Airport {} must have at least one gate.", id)));
        }
        let gates = (0..num_gates).map(|_| Gate::new()).collect();
        Ok(Airport { id, gates })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// First-fit placement of a plane.
    ///
    /// Gates are tried in ascending order and, within a gate, start slots from `earliest` up to
    /// `min(earliest + fuel, NUM_TIME_SLOTS - duration)`. The first free run of `duration` slots
    /// is booked. Each gate's guard is held only while that gate is searched and committed.
    ///
    /// Callers validate `earliest < NUM_TIME_SLOTS` and `earliest + duration <= NUM_TIME_SLOTS`.
    pub fn schedule_plane(&self, plane_id: PlaneId, earliest: usize, duration: usize, fuel: usize) -> Option<ScheduleResult> {
        if duration == 0 || earliest + duration > NUM_TIME_SLOTS {
            return None;
        }
        let latest_start = earliest.saturating_add(fuel).min(NUM_TIME_SLOTS - duration);

        for (gate_number, gate) in self.gates.iter().enumerate() {
            let mut table = gate.lock();

            let Some(start) = table.first_free_start(earliest, latest_start, duration) else {
                continue;
            };

            match table.commit(plane_id, start, start + duration - 1) {
                Ok(()) => {
                    log::debug!("Plane {} booked at gate {} slots [{}, {}).", plane_id, gate_number, start, start + duration);
                    return Some(ScheduleResult { gate_number, start_time: start, end_time: start + duration });
                }
                Err(e) => log::error!("Gate {} rejected a range it reported free: {}", gate_number, e),
            }
        }

        log::debug!("No gate can take plane {} within [{}, {}].", plane_id, earliest, latest_start);
        None
    }

    /// First booking of `plane_id`, scanning gates in ascending order.
    pub fn find_plane(&self, plane_id: PlaneId) -> Option<ScheduleResult> {
        self.gates.iter().enumerate().find_map(|(gate_number, gate)| {
            gate.lock().find_plane(plane_id).map(|(start, range_end)| ScheduleResult {
                gate_number,
                start_time: start,
                end_time: range_end + 1,
            })
        })
    }

    /// Snapshot of `duration` slots of one gate starting at `start`.
    ///
    /// The gate's guard is taken once and held until the whole range is copied out.
    pub fn dump_range(&self, gate_number: i64, start: i64, duration: i64) -> std::result::Result<Vec<SlotStatus>, RequestError> {
        let gate = usize::try_from(gate_number).ok().and_then(|g| self.gates.get(g)).ok_or(RequestError::InvalidGate(gate_number))?;

        let first = usize::try_from(start).ok().filter(|&s| s < NUM_TIME_SLOTS).ok_or(RequestError::InvalidStartIndex(start))?;

        let count = usize::try_from(duration)
            .ok()
            .filter(|&d| d > 0 && first + d <= NUM_TIME_SLOTS)
            .ok_or(RequestError::InvalidDuration(duration))?;

        let table = gate.lock();
        let statuses = (first..first + count)
            .filter_map(|index| {
                table.slot(index).map(|slot| SlotStatus { index, occupied: slot.is_occupied(), plane_id: slot.plane_id() })
            })
            .collect();
        drop(table);

        Ok(statuses)
    }
}
