pub mod merge;
pub mod repair;
pub mod report;
pub mod run;
pub mod validate;
