//! Admin token models shared by the login flow and the request layer.

pub mod token;

pub use token::{record::*, secret::*};
