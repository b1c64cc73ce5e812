//! Example-data plumbing: locate, fetch and verify the sample-asset
//! repository before any mesh is read from it.

pub mod checksum;
pub mod repo;
