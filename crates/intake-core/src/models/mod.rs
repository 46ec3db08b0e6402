pub mod form;
pub mod message;
pub mod onboarding;
pub mod question;
pub mod response;
pub mod session;
pub mod summary;
