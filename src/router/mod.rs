pub mod user_router;
pub mod application_router;
pub mod review_router;
pub mod estimate_router;
pub mod storage_router;
