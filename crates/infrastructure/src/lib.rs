//! Sinkhole Infrastructure Layer
pub mod database;
pub mod gravity;
pub mod repositories;
