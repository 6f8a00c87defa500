//! Share local files through temporary file hosts
//!
//! A run bundles the selected files ([`bundle`]), uploads the bundle through one
//! of the [`providers`], normalizes the returned link ([`link`]) and renders it
//! as a QR code ([`qr`]). [`pipeline`] composes these steps; [`config`] supplies
//! provider endpoints and limits.

pub mod bundle;
pub mod config;
pub mod humanize;
pub mod link;
pub mod observability;
pub mod pipeline;
pub mod providers;
pub mod qr;
