//! Core of the homicide report dashboard: UI state, the URL query codec,
//! cube request building and response reshaping, the dashboard controller,
//! the keyboard selection model and category colors. Front ends supply
//! the transport, the history and the viewport.

pub mod codec;
pub mod controller;
pub mod cursor;
pub mod error;
pub mod model;
pub mod month;
pub mod palette;
pub mod ports;
pub mod request;

pub use codec::{decode, encode, QueryState};
pub use controller::{DashboardController, FetchCommand};
pub use cursor::{CompareToggle, DashboardCursor, Focus, RangeMark};
pub use error::{FetchError, RequestError};
pub use model::{Counters, DateRange, FetchResult, Filter, LoadPhase, Slot, UiState};
pub use month::Timestamp;
pub use palette::{CategoryPalette, ColorStrategy, Rgb};
pub use ports::{ColumnLayout, FixedViewport, HistoryPort, MemoryHistory, ViewportProvider};
pub use request::{reshape, CubeEndpoint, DEFAULT_BASE_URL};
