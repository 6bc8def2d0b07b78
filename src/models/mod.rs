pub mod answer;
pub mod quiz;
pub mod quiz_question;
pub mod quiz_session;
