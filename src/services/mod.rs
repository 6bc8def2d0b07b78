pub mod content_client;
pub mod grading_service;
pub mod quiz_service;
pub mod session_service;
