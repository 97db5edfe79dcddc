pub mod birthday;
pub mod calendar;
pub mod notification;
