// Study-plan core: resource scoring, priority classification, and the
// greedy week allocator with its repair strategies. Pure and synchronous,
// operating only on data handed in by the caller.

pub mod allocator;
pub mod priority;
mod repair;
pub mod scoring;
