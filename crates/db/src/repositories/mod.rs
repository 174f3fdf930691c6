//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Multi-row mutations open their own
//! transaction.

pub mod account_repo;
pub mod class_repo;
pub mod discipline_repo;
pub(crate) mod filter;
pub mod group_repo;
pub mod professor_repo;
pub mod project_repo;
pub mod student_repo;
pub mod task_repo;

pub use account_repo::AccountRepo;
pub use class_repo::ClassRepo;
pub use discipline_repo::DisciplineRepo;
pub use group_repo::GroupRepo;
pub use professor_repo::ProfessorRepo;
pub use project_repo::ProjectRepo;
pub use student_repo::StudentRepo;
pub use task_repo::TaskRepo;
