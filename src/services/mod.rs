pub mod composer;
pub mod engine;
pub mod intent;
pub mod providers;
pub mod scoring;
pub mod sourcing;
