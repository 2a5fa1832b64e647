//! Pieslice - pie chart sector computation
//!
//! Resolves widget data sets into item metrics, picks history or trends per
//! item, aggregates values over a time period and turns them into sectors.

pub mod config;
pub mod db;
pub mod timeperiod;
pub mod timeunit;
pub mod units;
pub mod widget;

#[cfg(test)]
mod testing;
