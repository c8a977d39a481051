//! CLI subcommand modules.
//!
//! This module contains the implementations for all mktcap CLI subcommands.

pub(crate) mod catalog;
pub(crate) mod features;
pub(crate) mod fetch;
pub(crate) mod periods;
pub(crate) mod profile;
