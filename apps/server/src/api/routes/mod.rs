//! Route definitions

pub mod api;
pub mod pages;
