pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod document;
pub mod error;
pub mod report;
pub mod review;
pub mod session;

pub use checker::dictionary::{Dictionaries, GenericDictionary, ProjectDictionary};
pub use checker::Scanner;
pub use config::{Check, CheckOverrides, Checks, Config};
pub use document::{LineEnding, TextBuffer};
pub use error::{ErrorKind, ReviewError};
pub use report::{RemainingReport, ReportHeader};
pub use review::change::Change;
pub use review::cursor::Direction;
pub use review::ledger::{Exception, Ledger, Position, ReasonCode, Status};
pub use review::{Engine, Finished};
pub use session::ReviewSession;
