pub mod collection;
pub mod database;
pub mod error;
pub mod lock;
pub mod pool;

pub use collection::Collection;
pub use database::{Database, ReadTx, WriteTx};
pub use error::StoreError;
