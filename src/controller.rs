mod planner;
mod report;
mod task_runner;
mod update;

pub use update::update;
