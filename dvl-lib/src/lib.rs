#![doc = include_str!("../README.md")]

mod acquire;
mod error;
mod format;
mod poll;
mod publish;
mod transport;

pub mod framing;
pub mod pd5;

pub use acquire::{acquire, decode_window, Acquisition};
pub use error::{Error, OutcomeCode, Result};
pub use format::Format;
pub use pd5::DvlEnsemble;
pub use poll::{PollStats, Poller};
pub use publish::*;
pub use transport::{ReaderTransport, Transport};
