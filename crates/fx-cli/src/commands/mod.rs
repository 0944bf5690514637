//! CLI command implementations

pub(crate) mod apply;
pub(crate) mod build;
pub(crate) mod common;
pub(crate) mod identify;
pub(crate) mod lookup;
pub(crate) mod ls;
