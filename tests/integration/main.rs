//! Integration tests: full scan cycles against an in-memory marketplace.

mod mock_marketplace;
mod scan_cycle;
