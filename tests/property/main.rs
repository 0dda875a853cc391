// tests/property/main.rs

mod allocator;
mod discovery;
mod planner;
mod timing;
