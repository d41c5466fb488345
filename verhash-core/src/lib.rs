pub mod cancel;
pub mod digest;
pub mod error;
pub mod generate;
pub mod generator;
pub mod manifest;
pub mod path_safety;
pub mod progress;
pub mod request;
pub mod verify;
pub mod walk;

pub use cancel::CancelToken;
pub use error::{GenError, ManifestError};
pub use generator::{ManifestGenerator, RunHandle, RunState};
pub use manifest::{Manifest, ManifestEntry, NO_VERSION};
pub use progress::{Event, Outcome, ScanProgress};
pub use request::{OutputName, RunRequest};
