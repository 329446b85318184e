pub mod app;
pub mod movies;
pub mod user;
