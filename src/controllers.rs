//! Controller naming and discovery
//!
//! A controller is known only through its CSV log. Both the allow-list used for
//! `/data/*.csv` requests and the discovery range come from the same `ControllerSet`,
//! so they can never disagree about how many controllers exist.

use serde::Serialize;

use crate::store::ResourceStore;

/// Largest supported controller count; ids are a single decimal digit
pub const MAX_CONTROLLERS: u8 = 10;

/// Controller count used when `controllers.count` is not configured
pub const DEFAULT_CONTROLLERS: u8 = 6;

const NAME_PREFIX: &str = "mpr";
const FILE_SUFFIX: &str = "_stats.csv";
const PUBLIC_DATA_PREFIX: &str = "/data/";

/// One active controller as returned by `/api/controllers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Controller {
    pub id: u8,
    pub name: String,
    pub csv: String,
}

impl Controller {
    fn from_id(id: u8) -> Self {
        Self {
            id,
            name: format!("{NAME_PREFIX}{id}"),
            csv: format!("{PUBLIC_DATA_PREFIX}{}", csv_file_name(id)),
        }
    }
}

/// The fixed range of controller ids `[0, count)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSet {
    count: u8,
}

impl ControllerSet {
    /// Returns `None` when `count` is zero or above `MAX_CONTROLLERS`
    pub const fn new(count: u8) -> Option<Self> {
        if count == 0 || count > MAX_CONTROLLERS {
            None
        } else {
            Some(Self { count })
        }
    }

    pub const fn count(self) -> u8 {
        self.count
    }

    /// Match a basename against `mpr<d>_stats.csv`, anchored at both ends.
    ///
    /// Returns the controller id when `<d>` is one ASCII digit inside the range.
    pub fn parse_csv_name(self, name: &str) -> Option<u8> {
        let digits = name.strip_prefix(NAME_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
        let &[digit] = digits.as_bytes() else {
            return None;
        };
        if !digit.is_ascii_digit() {
            return None;
        }
        let id = digit - b'0';
        (id < self.count).then_some(id)
    }

    /// Probe every candidate file and keep those that exist with non-zero size.
    ///
    /// Only metadata is touched; results are in ascending id order.
    pub fn discover(self, store: &dyn ResourceStore) -> Vec<Controller> {
        (0..self.count)
            .filter(|&id| {
                let name = csv_file_name(id);
                store.exists(&name) && store.size(&name).is_some_and(|len| len > 0)
            })
            .map(Controller::from_id)
            .collect()
    }
}

impl Default for ControllerSet {
    fn default() -> Self {
        Self {
            count: DEFAULT_CONTROLLERS,
        }
    }
}

/// File name of a controller's CSV log inside the data directory
pub fn csv_file_name(id: u8) -> String {
    format!("{NAME_PREFIX}{id}{FILE_SUFFIX}")
}
