mod codec;
mod store;

pub use store::{StoreError, load, save};
