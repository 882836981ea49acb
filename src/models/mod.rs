pub mod disease;
pub mod drug;
pub mod efficacy;
pub mod enums;
pub mod opportunity;
pub mod session;
pub mod trial;

pub use disease::DiseaseMatch;
pub use drug::ApprovedDrug;
pub use efficacy::{EfficacyDataPoint, UNSCORED_CONFIDENCE};
pub use enums::*;
pub use opportunity::Opportunity;
pub use session::{
    resolve_extraction_status, resolve_session_status, BenchmarkSession, DrugBenchmarkResult,
};
pub use trial::{DiscoveredTrial, DrugTrialInfo};
