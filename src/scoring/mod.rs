pub mod embryo;
pub mod factors;
pub mod protocol;
pub mod success;
pub mod validation;

pub use embryo::{compute_embryo_quality, EmbryoGrade, EmbryoQuality};
pub use factors::{Band, FactorImpact, Threshold};
pub use protocol::{recommend_protocol, ExpectedResponse, Protocol, ProtocolPlan, TimingPlan};
pub use success::{compute_success, Outlook, SuccessPrediction};
pub use validation::validate_factors;
