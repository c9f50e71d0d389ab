use std::net::SocketAddr;

/// How the controller reaches one airport node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportEntry {
    pub id: usize,
    pub address: SocketAddr,
    /// Process id of the node, when the controller spawned it.
    pub pid: Option<u32>,
}

/// Airport id to backend address. Built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirportDirectory {
    entries: Vec<AirportEntry>,
}

impl AirportDirectory {
    /// `entries[k]` must describe airport `k`.
    pub fn new(entries: Vec<AirportEntry>) -> Self {
        debug_assert!(entries.iter().enumerate().all(|(k, e)| e.id == k), "airport ids must be dense and ordered");
        AirportDirectory { entries }
    }

    pub fn from_addresses(addresses: impl IntoIterator<Item = SocketAddr>) -> Self {
        Self::new(addresses.into_iter().enumerate().map(|(id, address)| AirportEntry { id, address, pid: None }).collect())
    }

    /// Entry for airport `airport`, `None` if the id is outside `0..len()`.
    pub fn resolve(&self, airport: i64) -> Option<&AirportEntry> {
        usize::try_from(airport).ok().and_then(|id| self.entries.get(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
