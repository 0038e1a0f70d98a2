//! Deduction Engine for supplementary benefit (supplerende stønad).
//!
//! This crate turns a claimant's deduction records (fradrag) and household
//! situation into per-month, rule-compliant deduction results, and combines
//! those with the statutory rate table into net monthly benefit amounts.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
