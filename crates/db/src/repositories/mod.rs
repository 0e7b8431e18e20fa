pub mod announcement_repo;
pub mod audit_repo;
pub mod otp_repo;
pub mod student_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use announcement_repo::AnnouncementRepo;
pub use audit_repo::AuditRepo;
pub use otp_repo::OtpRepo;
pub use student_repo::StudentRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
