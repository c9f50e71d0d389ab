use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::airport::airport::{ScheduleResult, SlotStatus};
use crate::domain::airport::slot::{PlaneId, SlotTime};

/// The commands both tiers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Schedule,
    PlaneStatus,
    TimeStatus,
}

impl Command {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "SCHEDULE" => Some(Command::Schedule),
            "PLANE_STATUS" => Some(Command::PlaneStatus),
            "TIME_STATUS" => Some(Command::TimeStatus),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Schedule => "SCHEDULE",
            Command::PlaneStatus => "PLANE_STATUS",
            Command::TimeStatus => "TIME_STATUS",
        }
    }

    /// Number of numeric fields after the command word.
    pub fn arity(&self) -> usize {
        match self {
            Command::Schedule => 5,
            Command::PlaneStatus => 2,
            Command::TimeStatus => 4,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A request rejected before it reached the scheduler. `Display` is the exact error line sent
/// back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Error: Invalid request provided")]
    InvalidRequest,

    #[error("Error: Invalid number of arguments for {0}")]
    InvalidArity(Command),

    #[error("Error: Invalid 'earliest' time ({0})")]
    InvalidEarliest(i64),

    #[error("Error: Invalid 'duration' value ({0})")]
    InvalidDuration(i64),

    #[error("Error: Invalid 'fuel' value ({0})")]
    InvalidFuel(i64),

    #[error("Error: Invalid 'gate' value ({0})")]
    InvalidGate(i64),

    #[error("Error: Invalid 'start_idx' value ({0})")]
    InvalidStartIndex(i64),

    #[error("Error: Airport {0} does not exist")]
    UnknownAirport(i64),

    #[error("Error: Could not connect to airport {0}")]
    AirportUnreachable(usize),
}

/// A parsed request line. Fields are kept as sent; range checks belong to the airport node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Schedule { airport: i64, plane_id: PlaneId, earliest: i64, duration: i64, fuel: i64 },
    PlaneStatus { airport: i64, plane_id: PlaneId },
    TimeStatus { airport: i64, gate: i64, start: i64, duration: i64 },
}

impl Request {
    /// Parses one request line.
    ///
    /// An empty line or unknown command is [`RequestError::InvalidRequest`]; a known command
    /// without exactly its numeric fields is [`RequestError::InvalidArity`].
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next().and_then(Command::from_token).ok_or(RequestError::InvalidRequest)?;

        let fields = tokens.map(|t| t.parse::<i64>()).collect::<Result<Vec<_>, _>>().map_err(|_| RequestError::InvalidArity(command))?;
        if fields.len() != command.arity() {
            return Err(RequestError::InvalidArity(command));
        }

        Ok(match command {
            Command::Schedule => {
                Request::Schedule { airport: fields[0], plane_id: fields[1], earliest: fields[2], duration: fields[3], fuel: fields[4] }
            }
            Command::PlaneStatus => Request::PlaneStatus { airport: fields[0], plane_id: fields[1] },
            Command::TimeStatus => Request::TimeStatus { airport: fields[0], gate: fields[1], start: fields[2], duration: fields[3] },
        })
    }

    pub fn command(&self) -> Command {
        match self {
            Request::Schedule { .. } => Command::Schedule,
            Request::PlaneStatus { .. } => Command::PlaneStatus,
            Request::TimeStatus { .. } => Command::TimeStatus,
        }
    }

    /// The airport a request is addressed to, always the first field.
    pub fn airport(&self) -> i64 {
        match *self {
            Request::Schedule { airport, .. } | Request::PlaneStatus { airport, .. } | Request::TimeStatus { airport, .. } => airport,
        }
    }
}

impl FromStr for Request {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Request::parse(s)
    }
}

/// One line an airport node writes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Scheduled { plane_id: PlaneId, result: ScheduleResult },
    CannotSchedule { plane_id: PlaneId },
    PlaneFound { plane_id: PlaneId, result: ScheduleResult },
    PlaneNotScheduled { plane_id: PlaneId, airport: usize },
    Slot { airport: usize, gate: usize, status: SlotStatus },
    Error(RequestError),
}

impl From<RequestError> for Response {
    fn from(e: RequestError) -> Self {
        Response::Error(e)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Scheduled { plane_id, result } => write!(
                f,
                "SCHEDULED {} at GATE {}: {}-{}",
                plane_id,
                result.gate_number,
                SlotTime(result.start_time),
                SlotTime(result.end_time)
            ),
            Response::CannotSchedule { plane_id } => write!(f, "Error: Cannot schedule {}", plane_id),
            Response::PlaneFound { plane_id, result } => write!(
                f,
                "PLANE {} scheduled at GATE {}: {}-{}",
                plane_id,
                result.gate_number,
                SlotTime(result.start_time),
                SlotTime(result.end_time)
            ),
            Response::PlaneNotScheduled { plane_id, airport } => write!(f, "PLANE {} not scheduled at airport {}", plane_id, airport),
            Response::Slot { airport, gate, status } => write!(
                f,
                "AIRPORT {} GATE {} {}: {} - {}",
                airport,
                gate,
                SlotTime(status.index),
                if status.occupied { 'A' } else { 'F' },
                status.plane_id
            ),
            Response::Error(e) => write!(f, "{}", e),
        }
    }
}
