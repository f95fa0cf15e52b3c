// QuillSpace: storage and HTTP API for a small publishing platform
//
// This is the library root. `db` holds the data model and both storage
// backends; `web` exposes them over JSON.

pub mod config;
pub mod db;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
