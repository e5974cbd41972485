//! toolrank - popularity scores for AI tool catalogs
//!
//! Turns GitHub stars, Product Hunt votes, app store ratings and monthly
//! active users into one comparable ranking score, orders tools by it, and
//! keeps a JSON catalog of tools fresh from the public APIs.

pub mod cli;
pub mod config;
pub mod models;
pub mod refresh;
pub mod scoring;
pub mod sources;
