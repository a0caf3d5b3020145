//! Origin-Register – verwaltet registrierte Plugins und ihre Origins
//!
//! Einzige Autoritaet fuer die Frage "ist dieser Absender ein
//! registriertes Plugin". Fuehrt neben den Eintraegen den abgeleiteten
//! Index Origin -> Titel.
//!
//! Registrierung kennt keinen Eindeutigkeits-Fehler: ein spaeterer Aufruf
//! mit demselben Titel ersetzt die bestehende Registrierung, und ein
//! wiederverwendeter Origin uebernimmt den Index-Eintrag des bisherigen
//! Inhabers. Ein Origin-Wechsel wird lediglich geloggt.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{info, warn};

use crate::types::{PluginBeschreibung, PluginEintrag, PluginKanal};

/// Register aller Plugins – thread-sicher via DashMap
pub struct OriginRegister {
    eintraege: DashMap<String, PluginEintrag>,
    /// Origin -> Titel Lookup; die letzte Registrierung eines Origins gewinnt
    origin_index: DashMap<String, String>,
}

impl OriginRegister {
    /// Erstellt ein neues leeres Register
    pub fn neu() -> Self {
        Self {
            eintraege: DashMap::new(),
            origin_index: DashMap::new(),
        }
    }

    /// Registriert ein Plugin oder ersetzt eine bestehende Registrierung
    pub fn registrieren(&self, beschreibung: PluginBeschreibung, kanal: Arc<dyn PluginKanal>) {
        let PluginBeschreibung { titel, url } = beschreibung;

        if let Some(bisheriger) = self.per_origin(&url) {
            if bisheriger != titel {
                warn!(
                    origin = %url,
                    von = %bisheriger,
                    an = %titel,
                    "Origin wechselt den Inhaber"
                );
            }
        }

        let eintrag = PluginEintrag {
            titel: titel.clone(),
            origin: url.clone(),
            kanal,
            registriert_am: Utc::now(),
        };
        self.eintraege.insert(titel.clone(), eintrag);
        self.origin_index.insert(url.clone(), titel.clone());
        info!(titel = %titel, origin = %url, "Plugin registriert");
    }

    /// Titel des Plugins das diesen Origin zuletzt beansprucht hat
    pub fn per_origin(&self, origin: &str) -> Option<String> {
        self.origin_index.get(origin).map(|titel| titel.clone())
    }

    /// Registrierung zu einem Titel
    pub fn per_titel(&self, titel: &str) -> Option<PluginEintrag> {
        self.eintraege.get(titel).map(|eintrag| eintrag.clone())
    }

    /// Alle aktuellen Registrierungen
    pub fn alle(&self) -> Vec<PluginEintrag> {
        self.eintraege
            .iter()
            .map(|eintrag| eintrag.value().clone())
            .collect()
    }

    /// Anzahl registrierter Plugins
    pub fn anzahl(&self) -> usize {
        self.eintraege.len()
    }
}

impl Default for OriginRegister {
    fn default() -> Self {
        Self::neu()
    }
}
