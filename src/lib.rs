pub mod client;
pub mod controller;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{ZipcloudClient, ZipcloudConfig};
pub use controller::{AddressLookup, AddressLookupController, LookupRequest, UiState};
pub use error::{INVALID_LENGTH_MESSAGE, LookupError};
pub use normalize::{InvalidPostalCode, NormalizePolicy, PostalCode};
pub use types::{Address, ZipcloudEntry, ZipcloudResponse};
