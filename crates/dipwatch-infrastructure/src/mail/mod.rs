pub mod log;
pub mod mailgun;
