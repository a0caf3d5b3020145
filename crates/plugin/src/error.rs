//! Fehlertypen fuer den Plugin-Router

use thiserror::Error;

/// Alle moeglichen Fehler im Plugin-Router
///
/// Nicht vertrauenswuerdige Absender tauchen hier bewusst nicht auf:
/// sie werden stillschweigend verworfen statt beantwortet (siehe
/// [`crate::router::EmpfangsErgebnis`]).
#[derive(Debug, Error)]
pub enum RouterFehler {
    /// (key, type)-Paar ist nicht in der Kapabilitaeten-Tabelle
    #[error("Unbekannte Kapabilitaet: {key}/{typ}")]
    UnbekannteKapabilitaet { key: String, typ: String },

    /// (key, type)-Paar wurde beim Aufbau der Tabelle doppelt vergeben
    #[error("Kapabilitaet bereits registriert: {key}/{typ}")]
    KapabilitaetDoppelt { key: String, typ: String },

    /// Payload liess sich nicht als Umschlag lesen oder schreiben
    #[error("Ungueltiger Umschlag: {0}")]
    UngueltigerUmschlag(#[from] serde_json::Error),
}

/// Result-Alias fuer den Plugin-Router
pub type Result<T> = std::result::Result<T, RouterFehler>;
