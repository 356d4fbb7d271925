pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod indicators;
pub mod models;
pub mod paper;
pub mod provider;
pub mod signals;
pub mod strategy;
pub mod strategy_utils;
pub mod trading_rules;
pub mod yahoo;
