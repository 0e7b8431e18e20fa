pub mod announcement;
pub mod audit;
pub mod otp;
pub mod student;
pub mod ticket;
pub mod user;
