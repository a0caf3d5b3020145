//! Kapabilitaeten-Tabelle und Anfrage-Dispatch
//!
//! Der Host stellt beim Bau des Routers eine Tabelle seiner
//! Kapabilitaeten bereit: pro (key, type)-Paar genau eine Funktion.
//! Doppelte Paare werden bereits bei der Registrierung abgelehnt, nicht
//! erst beim Aufruf.
//!
//! Eine Kapabilitaet erhaelt den Titel des Absenders, die Argumentliste
//! der Anfrage und eine [`Einmalantwort`]. Sie darf die Antwort synchron
//! oder aus einem beliebigen spaeteren Completion-Kontext abschliessen;
//! zwischen Aufruf und Abschluss fasst sie keinen Router-Zustand an.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use werkbank_protocol::{Envelope, ResponseError};

use crate::error::{Result, RouterFehler};

/// Einmaliger Abschluss eines Kapabilitaets-Aufrufs
///
/// Der Verbrauch von `self` erzwingt dass hoechstens einmal geantwortet
/// wird. Wird die Antwort nie abgeschlossen, bleibt die Anfrage aus Sicht
/// des Plugins offen; der Router haelt keinen Pending-Zustand.
pub struct Einmalantwort {
    weiter: Box<dyn FnOnce(Option<ResponseError>, Value) + Send>,
}

impl Einmalantwort {
    /// Erstellt eine Antwort aus einer Fortsetzung
    pub fn neu(weiter: impl FnOnce(Option<ResponseError>, Value) + Send + 'static) -> Self {
        Self {
            weiter: Box::new(weiter),
        }
    }

    /// Meldet das Ergebnis des Aufrufs zurueck
    pub fn senden(self, fehler: Option<ResponseError>, wert: Value) {
        (self.weiter)(fehler, wert)
    }

    /// Kurzform fuer ein erfolgreiches Ergebnis
    pub fn erfolg(self, wert: Value) {
        self.senden(None, wert)
    }

    /// Kurzform fuer einen Fehlschlag
    pub fn fehlschlag(self, fehler: ResponseError) {
        self.senden(Some(fehler), Value::Null)
    }
}

/// Eine Host-Kapabilitaet: (Absender-Titel, Argumente, Einmalantwort)
pub type KapabilitaetsFn = Arc<dyn Fn(&str, Vec<Value>, Einmalantwort) + Send + Sync>;

/// Tabelle aller Host-Kapabilitaeten, adressiert ueber (key, type)
#[derive(Default)]
pub struct KapabilitaetsTabelle {
    eintraege: HashMap<(String, String), KapabilitaetsFn>,
}

impl KapabilitaetsTabelle {
    /// Erstellt eine leere Tabelle
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine Kapabilitaet unter (key, type)
    pub fn registrieren(
        &mut self,
        key: impl Into<String>,
        typ: impl Into<String>,
        kapabilitaet: impl Fn(&str, Vec<Value>, Einmalantwort) + Send + Sync + 'static,
    ) -> Result<()> {
        let key = key.into();
        let typ = typ.into();
        if self.eintraege.contains_key(&(key.clone(), typ.clone())) {
            return Err(RouterFehler::KapabilitaetDoppelt { key, typ });
        }
        self.eintraege.insert((key, typ), Arc::new(kapabilitaet));
        Ok(())
    }

    /// Schlaegt eine Kapabilitaet nach
    pub fn auffinden(&self, key: &str, typ: &str) -> Option<KapabilitaetsFn> {
        self.eintraege
            .get(&(key.to_string(), typ.to_string()))
            .cloned()
    }

    /// Anzahl registrierter Kapabilitaeten
    pub fn anzahl(&self) -> usize {
        self.eintraege.len()
    }
}

/// Fuehrt eine eingehende Anfrage gegen die Tabelle aus
///
/// Die Antwort-Fortsetzung schliesst `id`, `key` und `type` der Anfrage
/// zum Dispatch-Zeitpunkt ein und baut daraus die Response; eine separate
/// Pending-Tabelle gibt es nicht. Die fertige Response wird an
/// `antwort_senke` uebergeben.
pub fn anfrage_ausfuehren(
    tabelle: &KapabilitaetsTabelle,
    absender: &str,
    id: u64,
    key: &str,
    typ: &str,
    werte: Vec<Value>,
    antwort_senke: impl FnOnce(Envelope) + Send + 'static,
) -> Result<()> {
    let Some(kapabilitaet) = tabelle.auffinden(key, typ) else {
        return Err(RouterFehler::UnbekannteKapabilitaet {
            key: key.to_string(),
            typ: typ.to_string(),
        });
    };

    let antwort_key = key.to_string();
    let antwort_typ = typ.to_string();
    let antwort = Einmalantwort::neu(move |fehler, wert| {
        antwort_senke(Envelope::response(
            id,
            antwort_key,
            antwort_typ,
            fehler,
            vec![wert],
        ));
    });

    kapabilitaet(absender, werte, antwort);
    Ok(())
}
