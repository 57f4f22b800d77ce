pub mod document;
pub mod errors;
pub mod load;
pub mod save;

pub use document::{storage_filename, ComponentDocument, SimulationDocument};
pub use errors::{LoadError, SaveError};
pub use load::{load_component, load_simulation};
pub use save::{save_component, save_simulation};
