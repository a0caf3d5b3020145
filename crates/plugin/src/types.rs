//! Grundlegende Typen fuer den Plugin-Router

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registrierungs-Beschreibung eines Plugins
///
/// Kommt als JSON aus der Host-Oberflaeche:
/// `{ "title": "<name>", "url": "<origin>" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginBeschreibung {
    /// Eindeutiger Name, Schluessel der Registrierung
    #[serde(rename = "title")]
    pub titel: String,
    /// Vertrauenswuerdiger Message-Origin des Plugins
    pub url: String,
}

impl PluginBeschreibung {
    pub fn neu(titel: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            titel: titel.into(),
            url: url.into(),
        }
    }
}

/// Zustellziel eines Plugins
///
/// Der Router behandelt das Ziel als write-only; die konkrete
/// Implementierung (Cross-Window-Messaging, Kanal, Testpuffer)
/// liefert der Host bei der Registrierung.
pub trait PluginKanal: Send + Sync {
    /// Uebergibt einen serialisierten Umschlag an das Plugin, mit dem
    /// Origin der Registrierung als Vertrauensgrenze der Zustellung
    fn senden(&self, payload: &str, ziel_origin: &str);
}

/// Eintrag eines registrierten Plugins
#[derive(Clone)]
pub struct PluginEintrag {
    pub titel: String,
    pub origin: String,
    pub kanal: Arc<dyn PluginKanal>,
    pub registriert_am: DateTime<Utc>,
}

impl std::fmt::Debug for PluginEintrag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEintrag")
            .field("titel", &self.titel)
            .field("origin", &self.origin)
            .field("registriert_am", &self.registriert_am)
            .finish_non_exhaustive()
    }
}

/// Ergebnis einer Unicast-Zustellung
///
/// Nach aussen bleibt jede nicht moegliche Zustellung ein stiller No-op;
/// das Ergebnis dient der internen Beobachtbarkeit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zustellung {
    /// An den Kanal des Plugins uebergeben
    Zugestellt,
    /// Ziel-Titel nicht registriert
    NichtRegistriert,
    /// Origin nicht im Register
    OriginUnbekannt,
}

/// Aktives Ausfuehrungs-Backend des Hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AusfuehrungsBackend {
    /// In-Prozess betriebene virtuelle Maschine
    Virtuell,
    /// Angebundenes Live- oder Remote-Backend
    Extern,
}

/// Seam zum Ausfuehrungskontext des Hosts
///
/// Der Router fragt nur das aktive Backend ab; alles Weitere ist
/// Sache des Hosts.
pub trait AusfuehrungsKontext: Send + Sync {
    fn aktives_backend(&self) -> AusfuehrungsBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beschreibung_aus_host_json() {
        let json = r#"{"title": "vyper", "url": "https://vyper.example"}"#;
        let beschreibung: PluginBeschreibung = serde_json::from_str(json).unwrap();
        assert_eq!(beschreibung.titel, "vyper");
        assert_eq!(beschreibung.url, "https://vyper.example");
    }

    #[test]
    fn beschreibung_serialisiert_title_feld() {
        let beschreibung = PluginBeschreibung::neu("vyper", "https://vyper.example");
        let wert = serde_json::to_value(&beschreibung).unwrap();
        assert_eq!(wert["title"], "vyper");
        assert_eq!(wert["url"], "https://vyper.example");
    }

    #[test]
    fn eintrag_debug_ohne_kanal() {
        struct StummKanal;
        impl PluginKanal for StummKanal {
            fn senden(&self, _payload: &str, _ziel_origin: &str) {}
        }

        let eintrag = PluginEintrag {
            titel: "vyper".into(),
            origin: "https://vyper.example".into(),
            kanal: Arc::new(StummKanal),
            registriert_am: Utc::now(),
        };
        let anzeige = format!("{eintrag:?}");
        assert!(anzeige.contains("vyper"));
        assert!(anzeige.contains("https://vyper.example"));
    }
}
