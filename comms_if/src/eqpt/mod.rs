//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with the gimbal's equipment.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod act;
pub mod orient;
pub mod target;
