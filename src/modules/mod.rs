pub mod admins;
pub mod auth;
pub mod courses;
pub mod departments;
pub mod forms;
pub mod students;
pub mod submissions;
pub mod teachers;
