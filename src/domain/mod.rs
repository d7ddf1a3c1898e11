pub mod demo;
pub mod git_link;
pub mod summary;
pub mod ticket;
