// Domain-layer modules and shared errors/models
pub mod orchestrator {
    pub use crate::orchestrator::*;
}

pub mod synthesizer {
    pub use crate::synthesizer::*;
}

pub mod normalize {
    pub use crate::normalize::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
