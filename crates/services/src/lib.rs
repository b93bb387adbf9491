//! # services
//!
//! Application services orchestrating the domain aggregates through the
//! repository and auth ports. Every mutating call takes the authenticated
//! caller explicitly.

pub mod account;
pub mod post;
pub mod profile;
pub mod validation;

pub use account::{gravatar_url, AccountService, LoginInput, RegisterInput};
pub use post::{PostService, TextInput};
pub use profile::{parse_skills, EducationInput, ExperienceInput, ProfileInput, ProfileService};
