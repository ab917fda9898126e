pub mod animator;
pub mod app;
pub mod asset;
pub mod audio;
pub mod clones;
pub mod compose;
pub mod config;
pub mod params;
pub mod phase;
pub mod prefs;
pub mod render;
pub mod solver;
pub mod terminal;
