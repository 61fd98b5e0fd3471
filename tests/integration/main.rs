//! Integration tests for Listing-Harvester
//!
//! These tests use wiremock to serve directory, detail and company pages and
//! drive the real HTTP driver through full crawl cycles.

mod common;
mod crawl_tests;
mod email_tests;
mod navigation_tests;
