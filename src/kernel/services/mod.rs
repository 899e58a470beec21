//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used by the compare core.
//! - `adapters`: in-memory host, line diff engine, prompts, settings IO.

pub mod adapters;
pub mod ports;
