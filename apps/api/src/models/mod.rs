pub mod notification;
pub mod posting;
pub mod profile;

pub use posting::{EmploymentType, JobPosting};
pub use profile::Profile;
