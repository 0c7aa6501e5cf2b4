pub mod analytics;
pub mod auth;
pub mod mailer;
pub mod newsletter;
pub mod subscriber;
