//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod school;
pub mod member;
pub mod subject;
pub mod class;
pub mod calendar;
pub mod records;
pub mod admin;

// Re-export repositories
pub use user::{UserRepository, NewUser};
pub use school::SchoolRepository;
pub use member::MemberRepository;
pub use subject::SubjectRepository;
pub use class::ClassRepository;
pub use calendar::CalendarRepository;
pub use records::RecordRepository;
pub use admin::{AdminRepository, TableQuery};
