#![doc = "cheatsheets-core: core logic library for the cheatsheets browser."]

//! This crate holds everything with real behaviour: listing sheets from a
//! repository, cleaning their markdown for display, and persisting favorites.
//! The CLI crate only parses arguments and prints what this crate returns.
//!
//! # Usage
//! Build a [`catalog::Catalog`] from a [`contract::Repository`] and a
//! [`favorites::FavoritesStore`], then call `list`, `open`,
//! `add_favorite`, `remove_favorite` or `url_for`.

pub mod catalog;
pub mod config;
pub mod contract;
pub mod favorites;
pub mod pipeline;
pub mod repository;
