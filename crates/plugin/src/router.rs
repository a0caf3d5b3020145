//! ZustellRouter – Fassade des Plugin-Nachrichtenrouters
//!
//! Verbindet Origin-Register, Fokus-Maschine und Kapabilitaeten-Tabelle:
//! entscheidet fuer jede ausgehende Nachricht welche Plugins sie erhalten
//! und fuehrt eingehende Anfragen gegen die Host-Kapabilitaeten aus.
//!
//! Registrierungen und Fokus-Wechsel sind selten im Vergleich zum
//! Nachrichtenverkehr; Lesezugriffe wirken als Momentaufnahme zum
//! Aufrufzeitpunkt. Antwort-Fortsetzungen duerfen aus beliebigen
//! Completion-Kontexten feuern, sie lesen Router-Zustand nur ueber die
//! Zustell-Pfade.

use std::sync::{Arc, Weak};

use serde_json::Value;
use tracing::{debug, warn};

use werkbank_protocol::{Envelope, ResponseError};

use crate::error::{Result, RouterFehler};
use crate::fokus::FokusMaschine;
use crate::kapabilitaet::{anfrage_ausfuehren, Einmalantwort, KapabilitaetsTabelle};
use crate::register::OriginRegister;
use crate::types::{PluginBeschreibung, PluginKanal, Zustellung};

/// Konfiguration fuer den ZustellRouter
#[derive(Debug, Clone, Default)]
pub struct RouterKonfiguration {
    /// Fokus-Token rueckt nur auf registrierte Plugins vor
    /// (Standard: aus – der Fokus darf auch auf einen Tab ohne Plugin
    /// zeigen, siehe [`crate::fokus::FokusMaschine::wechseln`])
    pub fokus_nur_registrierte: bool,
}

/// Ergebnis der Verarbeitung einer eingehenden Transport-Nachricht
///
/// Nach aussen bleiben alle Verwerfungen still (keine Antwort auf dem
/// Draht, ausser bei [`EmpfangsErgebnis::UnbekannteKapabilitaet`] und
/// bergbaren ungueltigen Umschlaegen); das Ergebnis macht die Pfade
/// intern beobachtbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmpfangsErgebnis {
    /// Anfrage wurde an eine Kapabilitaet uebergeben
    Verarbeitet,
    /// Absender-Origin ist nicht registriert – stiller Drop
    OriginNichtVertraut,
    /// Absender ist nicht das fokussierte Plugin – stiller Drop
    NichtImFokus,
    /// Payload war kein gueltiger Request-Umschlag
    Ungueltig,
    /// (key, type) ohne Kapabilitaet – mit Fehlercode 500 beantwortet
    UnbekannteKapabilitaet,
}

/// Fassade des Plugin-Nachrichtenrouters
pub struct ZustellRouter {
    register: OriginRegister,
    fokus: FokusMaschine,
    kapabilitaeten: KapabilitaetsTabelle,
    /// Fuer Antwort-Fortsetzungen die den Router ueberleben koennten
    selbst: Weak<ZustellRouter>,
}

impl ZustellRouter {
    /// Erstellt einen neuen Router mit der Kapabilitaeten-Tabelle des Hosts
    pub fn neu(kapabilitaeten: KapabilitaetsTabelle, konfiguration: RouterKonfiguration) -> Arc<Self> {
        Arc::new_cyclic(|selbst| Self {
            register: OriginRegister::neu(),
            fokus: FokusMaschine::neu(konfiguration.fokus_nur_registrierte),
            kapabilitaeten,
            selbst: selbst.clone(),
        })
    }

    /// Registriert ein Plugin samt Zustellkanal
    pub fn registrieren(&self, beschreibung: PluginBeschreibung, kanal: Arc<dyn PluginKanal>) {
        self.register.registrieren(beschreibung, kanal);
    }

    /// Aktueller Fokus-Halter, falls vorhanden
    pub fn fokus_titel(&self) -> Option<String> {
        self.fokus.aktueller()
    }

    /// Anzahl registrierter Plugins
    pub fn anzahl_plugins(&self) -> usize {
        self.register.anzahl()
    }

    // -----------------------------------------------------------------------
    // Ausgehende Zustellung
    // -----------------------------------------------------------------------

    /// Sendet einen Umschlag an alle registrierten Plugins, unabhaengig
    /// vom Fokus
    ///
    /// Serialisiert genau einmal; jedes Plugin erhaelt denselben Payload.
    /// Gibt die Anzahl der Zustellungen zurueck.
    pub fn rundruf(&self, umschlag: &Envelope) -> Result<usize> {
        let payload = umschlag.to_json()?;
        let eintraege = self.register.alle();
        for eintrag in &eintraege {
            eintrag.kanal.senden(&payload, &eintrag.origin);
        }
        Ok(eintraege.len())
    }

    /// Unicast eines serialisierten Umschlags an einen Titel
    pub fn post(&self, titel: &str, payload: &str) -> Zustellung {
        match self.register.per_titel(titel) {
            Some(eintrag) => {
                eintrag.kanal.senden(payload, &eintrag.origin);
                Zustellung::Zugestellt
            }
            None => {
                debug!(titel, "Zustellung verworfen: Titel nicht registriert");
                Zustellung::NichtRegistriert
            }
        }
    }

    /// Unicast eines serialisierten Umschlags an einen Origin
    pub fn post_an_origin(&self, origin: &str, payload: &str) -> Zustellung {
        match self.register.per_origin(origin) {
            Some(titel) => self.post(&titel, payload),
            None => {
                debug!(origin, "Zustellung verworfen: Origin unbekannt");
                Zustellung::OriginUnbekannt
            }
        }
    }

    /// Baut eine Notification, serialisiert sie und stellt sie zu
    pub fn benachrichtigen(
        &self,
        titel: &str,
        key: &str,
        typ: &str,
        werte: Vec<Value>,
    ) -> Result<Zustellung> {
        let payload = Envelope::notification(key, typ, werte).to_json()?;
        Ok(self.post(titel, &payload))
    }

    // -----------------------------------------------------------------------
    // Fokus
    // -----------------------------------------------------------------------

    /// Verarbeitet einen Tab-Wechsel des Hosts
    ///
    /// Sendet `app`/`unfocus` an den vorherigen Halter, `app`/`focus` an
    /// das neue Ziel falls es registriert ist, und reicht danach die
    /// aktuellen Kompilierungsdaten nach sobald der Provider antwortet.
    pub fn tab_gewechselt(&self, ziel: &str) -> Result<()> {
        let registriert = self.register.per_titel(ziel).is_some();
        let wechsel = self.fokus.wechseln(ziel, registriert);

        if let Some(vorheriger) = &wechsel.entfokussiert {
            self.benachrichtigen(vorheriger, "app", "unfocus", Vec::new())?;
        }
        if let Some(neuer) = &wechsel.fokussiert {
            self.benachrichtigen(neuer, "app", "focus", Vec::new())?;
            self.kompilat_nachreichen(neuer);
        }
        Ok(())
    }

    /// Fragt den Kompilierungs-Provider fuer ein frisch fokussiertes
    /// Plugin an und stellt das Ergebnis als `compiler`/`compilationData`
    /// nach – nur wenn der Provider keinen Fehler meldet; die Daten
    /// selbst duerfen `null` sein
    fn kompilat_nachreichen(&self, titel: &str) {
        let Some(provider) = self
            .kapabilitaeten
            .auffinden("compiler", "getCompilationResult")
        else {
            debug!(titel, "Kein Kompilierungs-Provider in der Tabelle");
            return;
        };

        let selbst = self.selbst.clone();
        let ziel = titel.to_string();
        let antwort = Einmalantwort::neu(move |fehler, daten| {
            if fehler.is_some() {
                debug!(titel = %ziel, "Kompilierungsdaten nicht verfuegbar");
                return;
            }
            let Some(router) = selbst.upgrade() else { return };
            if let Err(fehler) = router.benachrichtigen(&ziel, "compiler", "compilationData", vec![daten]) {
                warn!(%fehler, "compilationData nicht zustellbar");
            }
        });
        provider(titel, Vec::new(), antwort);
    }

    // -----------------------------------------------------------------------
    // Eingehende Nachrichten
    // -----------------------------------------------------------------------

    /// Verarbeitet eine rohe Nachricht vom Transport
    ///
    /// Nur das fokussierte Plugin wird bedient. Unbekannte Origins und
    /// nicht fokussierte Absender werden ohne Antwort verworfen – eine
    /// Antwort wuerde verraten welche Origins gueltig sind.
    pub fn nachricht_empfangen(&self, origin: &str, rohdaten: &str) -> EmpfangsErgebnis {
        if self.register.per_origin(origin).is_none() {
            debug!(origin, "Nachricht verworfen: Origin nicht registriert");
            return EmpfangsErgebnis::OriginNichtVertraut;
        }

        let Some(fokus_titel) = self.fokus.aktueller() else {
            debug!(origin, "Nachricht verworfen: kein Plugin im Fokus");
            return EmpfangsErgebnis::NichtImFokus;
        };
        let Some(fokus_eintrag) = self.register.per_titel(&fokus_titel) else {
            debug!(origin, "Nachricht verworfen: Fokus-Halter nicht registriert");
            return EmpfangsErgebnis::NichtImFokus;
        };
        if fokus_eintrag.origin != origin {
            debug!(origin, "Nachricht verworfen: Absender nicht im Fokus");
            return EmpfangsErgebnis::NichtImFokus;
        }

        let umschlag = match Envelope::from_json(rohdaten) {
            Ok(umschlag) => umschlag,
            Err(fehler) => return self.ungueltige_nachricht(origin, rohdaten, &fehler),
        };
        let Envelope::Request { id, key, typ, value } = umschlag else {
            warn!(origin, "Nachricht verworfen: kein Request-Umschlag");
            return EmpfangsErgebnis::Ungueltig;
        };

        let selbst = self.selbst.clone();
        let antwort_origin = origin.to_string();
        let ergebnis = anfrage_ausfuehren(
            &self.kapabilitaeten,
            &fokus_titel,
            id,
            &key,
            &typ,
            value,
            move |antwort| {
                let Some(router) = selbst.upgrade() else { return };
                match antwort.to_json() {
                    Ok(payload) => {
                        router.post_an_origin(&antwort_origin, &payload);
                    }
                    Err(fehler) => warn!(%fehler, "Antwort nicht serialisierbar – verworfen"),
                }
            },
        );

        match ergebnis {
            Ok(()) => EmpfangsErgebnis::Verarbeitet,
            Err(RouterFehler::UnbekannteKapabilitaet { .. }) => {
                self.fehler_antworten(
                    origin,
                    id,
                    &key,
                    &typ,
                    format!("Unbekannte Kapabilitaet: {key}/{typ}"),
                );
                EmpfangsErgebnis::UnbekannteKapabilitaet
            }
            Err(fehler) => {
                warn!(origin, %fehler, "Anfrage nicht ausfuehrbar – verworfen");
                EmpfangsErgebnis::Ungueltig
            }
        }
    }

    /// Versucht aus einem nicht parsebaren Payload noch `id`, `key` und
    /// `type` zu bergen um den Fehler ans Plugin zurueckzumelden; ohne
    /// diese Felder gibt es nichts zu korrelieren und der Payload wird
    /// verworfen
    fn ungueltige_nachricht(
        &self,
        origin: &str,
        rohdaten: &str,
        fehler: &serde_json::Error,
    ) -> EmpfangsErgebnis {
        let geborgen = serde_json::from_str::<Value>(rohdaten)
            .ok()
            .and_then(|wert| {
                let id = wert.get("id")?.as_u64()?;
                let key = wert.get("key")?.as_str()?.to_string();
                let typ = wert.get("type")?.as_str()?.to_string();
                Some((id, key, typ))
            });

        match geborgen {
            Some((id, key, typ)) => {
                warn!(origin, %fehler, "Ungueltiger Umschlag – mit Fehler 500 beantwortet");
                self.fehler_antworten(origin, id, &key, &typ, format!("Ungueltiger Umschlag: {fehler}"));
            }
            None => warn!(origin, %fehler, "Ungueltiger Umschlag – verworfen"),
        }
        EmpfangsErgebnis::Ungueltig
    }

    /// Beantwortet eine Anfrage mit einem generischen Fehler statt den
    /// Router zu beenden
    fn fehler_antworten(&self, origin: &str, id: u64, key: &str, typ: &str, meldung: String) {
        let antwort = Envelope::response(
            id,
            key,
            typ,
            Some(ResponseError::generisch(meldung)),
            vec![Value::Null],
        );
        match antwort.to_json() {
            Ok(payload) => {
                self.post_an_origin(origin, &payload);
            }
            Err(fehler) => warn!(%fehler, "Fehler-Antwort nicht serialisierbar"),
        }
    }
}
