pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod review;
pub mod web;
