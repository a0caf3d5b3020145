//! werkbank-protocol – Wire-Format der Plugin-Schnittstelle
//!
//! Dieses Crate definiert die Nachrichten-Umschlaege die zwischen dem
//! Werkbank-Host und seinen Plugins ueber den Message-Transport
//! ausgetauscht werden.

pub mod envelope;

pub use envelope::{Envelope, ResponseError, GENERISCHER_FEHLERCODE};
