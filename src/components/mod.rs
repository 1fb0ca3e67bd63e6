pub mod calculator;
pub mod diagram;
pub mod gallery;
pub mod photo;
