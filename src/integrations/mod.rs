//! External service integrations.

pub mod mailer {
    pub use crate::mailer::*;
}

pub mod notifications {
    pub use crate::notifications::*;
}

pub mod enrichment {
    pub use crate::enrichment::*;
}

pub mod circuit_breaker {
    pub use crate::circuit_breaker::*;
}
