pub mod alert;
pub mod animation;
pub mod api;
pub mod config;
pub mod controller;
pub mod data_models;
pub mod error;
pub mod health;
pub mod render;
pub mod terminal;
pub mod view;

pub use controller::{ControllerPhase, ControllerSettings, SearchController, SubmitOutcome};
pub use error::SearchError;
