pub mod calendar;
pub mod evaluator;
pub mod notification;
pub mod snapshot;
