//! werkbank-plugin – Nachrichtenrouter zwischen Host und Plugins
//!
//! Dieses Crate implementiert die Host-Seite der Plugin-Schnittstelle:
//! Plugins laufen isoliert hinter einer Message-Passing-Grenze und werden
//! mit Titel und vertrauenswuerdigem Origin registriert. Der Router stellt
//! Benachrichtigungen zu (Unicast an das fokussierte Plugin oder Rundruf
//! an alle) und fuehrt eingehende Anfragen gegen die Kapabilitaeten des
//! Hosts aus.
//!
//! # Architektur
//! - [`register::OriginRegister`] – wer ist registriert, welcher Origin gehoert wem
//! - [`fokus::FokusMaschine`] – hoechstens ein Plugin haelt den Fokus
//! - [`kapabilitaet::KapabilitaetsTabelle`] – (key, type) -> Host-Funktion
//! - [`router::ZustellRouter`] – Fassade: registrieren, rundruf, post, Empfang
//! - [`bruecke`] – Host-Ereignisse in Plugin-Nachrichten uebersetzen

pub mod bruecke;
pub mod error;
pub mod fokus;
pub mod kapabilitaet;
pub mod register;
pub mod router;
pub mod types;

// Bequeme Re-Exporte
pub use bruecke::{verbinden, EreignisStrom, HostEreignisse, KompilierungBeendet};
pub use error::{Result, RouterFehler};
pub use fokus::{FokusMaschine, FokusWechsel};
pub use kapabilitaet::{Einmalantwort, KapabilitaetsFn, KapabilitaetsTabelle};
pub use register::OriginRegister;
pub use router::{EmpfangsErgebnis, RouterKonfiguration, ZustellRouter};
pub use types::{
    AusfuehrungsBackend, AusfuehrungsKontext, PluginBeschreibung, PluginEintrag, PluginKanal,
    Zustellung,
};
