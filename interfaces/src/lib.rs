pub mod defs;
pub mod state;

pub use defs::{Credentials, DeliveryError, DigestSink, RenderedDigest};
pub use state::{SeenStore, StoreError};
