pub mod db;
pub mod route;
pub mod steps;
pub mod token;
