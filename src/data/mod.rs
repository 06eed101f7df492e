//! Persistence layer.

pub mod store {
    pub use crate::store::*;
}

pub mod postgres {
    pub use crate::db::*;
    pub use crate::db_storage::*;
}

pub mod memory {
    pub use crate::memory_store::*;
}
