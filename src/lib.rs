//! GoldenFE: golden-ratio calculator, spiral diagram and composition overlay.
//!
//! Geometry, rasterization, placement and drag live in [`ops`] and have no
//! GUI dependency; [`app`] and [`components`] are the egui shell on top.

#![allow(clippy::too_many_arguments)]

#[macro_use]
pub mod logger;
#[macro_use]
pub mod i18n;
pub mod app;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod config;
pub mod io;
pub mod ops;
pub mod session;
