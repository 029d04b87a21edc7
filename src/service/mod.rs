pub mod user_service;
pub mod application_service;
pub mod review_service;
pub mod estimate_service;
