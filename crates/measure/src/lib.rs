// Library crate: measurement model, tool state machines and the headless
// harness. Hosts supply viewports, a render target and a quantity formatter.

pub mod command;
pub mod events;
pub mod fixtures;
pub mod format;
pub mod geometry;
pub mod harness;
pub mod i18n;
pub mod manager;
pub mod measurement;
pub mod pick;
pub mod render;
pub mod state;
pub mod tools;
pub mod view_target;
pub mod viewport;
