//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the control rules for the incubator: the per-cycle
//! sample → decide → actuate → report algorithm and its failure containment.
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod events;
pub mod ports;
pub mod reading;
pub mod service;
