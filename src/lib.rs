//! Courier Link - Realtime Notification Client
//!
//! This crate implements the realtime client for the courier delivery
//! platform: a persistent WebSocket session to the realtime gateway, a typed
//! in-process event bus, fire-and-forget domain actions, and reactive handles
//! for UI consumption.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
