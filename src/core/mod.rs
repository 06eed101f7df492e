// Domain-layer modules and shared errors/models
pub mod scoring {
    pub use crate::scoring::*;
}

pub mod qualification {
    pub use crate::qualification::*;
}

pub mod resolver {
    pub use crate::resolver::*;
}

pub mod ingestion {
    pub use crate::ingestion::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
