//! rubench: measures what two document-modeling strategies cost on a
//! partitioned, consumption-billed document database.

pub mod bench;
pub mod config;
pub mod container;
pub mod cosmos;
pub mod error;
pub mod generator;
pub mod model;
pub mod report;
pub mod seeder;
