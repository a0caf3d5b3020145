//! Nachrichten-Umschlaege der Host/Plugin-Grenze
//!
//! Definiert die drei Nachrichtenformen die ueber den Message-Transport
//! laufen, unterschieden ueber das `action`-Feld:
//!
//! - Notification: Host -> Plugin, fire-and-forget, ohne `id`
//! - Request: Plugin -> Host, `id` vergibt der Absender
//! - Response: Host -> Plugin, `id` wird unveraendert gespiegelt
//!
//! ## Design
//! - JSON-Serialisierung via serde, Tagged Enum auf `action`
//! - `value` ist eine geordnete Argumentliste mit beliebigem JSON-Inhalt
//! - Das `error`-Feld einer Response ist bei Erfolg explizit `null`;
//!   ein fehlendes `error`-Feld wird beim Einlesen als Erfolg gewertet

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Fehler-Objekt
// ---------------------------------------------------------------------------

/// Generischer Fehlercode fuer Response-Fehler
pub const GENERISCHER_FEHLERCODE: u32 = 500;

/// Fehler-Objekt einer Response
///
/// `code` ist immer gesetzt; `msg`, `data` und `stack` sind optional und
/// werden bei Abwesenheit nicht serialisiert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ResponseError {
    /// Erstellt einen generischen Fehler (Code 500) mit Beschreibung
    pub fn generisch(msg: impl Into<String>) -> Self {
        Self {
            code: GENERISCHER_FEHLERCODE,
            msg: Some(msg.into()),
            data: None,
            stack: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Umschlag
// ---------------------------------------------------------------------------

/// Nachrichten-Umschlag mit Request/Response-Zuordnung
///
/// Jede Anfrage traegt eine `id` die das Plugin vergibt. Der Host kopiert
/// die `id` samt `key` und `type` in die Antwort, damit das Plugin Anfrage
/// und Antwort zuordnen kann. Der Host prueft die Eindeutigkeit der `id`
/// nicht; doppelte Vergabe ist ein Problem des Plugins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Envelope {
    /// Benachrichtigung vom Host an ein Plugin
    Notification {
        key: String,
        #[serde(rename = "type")]
        typ: String,
        value: Vec<Value>,
    },
    /// Anfrage eines Plugins an den Host
    Request {
        id: u64,
        key: String,
        #[serde(rename = "type")]
        typ: String,
        value: Vec<Value>,
    },
    /// Antwort des Hosts auf eine Anfrage
    Response {
        id: u64,
        key: String,
        #[serde(rename = "type")]
        typ: String,
        value: Vec<Value>,
        #[serde(default)]
        error: Option<ResponseError>,
    },
}

impl Envelope {
    /// Erstellt eine Notification
    pub fn notification(
        key: impl Into<String>,
        typ: impl Into<String>,
        value: Vec<Value>,
    ) -> Self {
        Self::Notification {
            key: key.into(),
            typ: typ.into(),
            value,
        }
    }

    /// Erstellt eine Anfrage
    pub fn request(
        id: u64,
        key: impl Into<String>,
        typ: impl Into<String>,
        value: Vec<Value>,
    ) -> Self {
        Self::Request {
            id,
            key: key.into(),
            typ: typ.into(),
            value,
        }
    }

    /// Erstellt eine Antwort; `id`, `key` und `type` muessen die Werte der
    /// zugehoerigen Anfrage sein
    pub fn response(
        id: u64,
        key: impl Into<String>,
        typ: impl Into<String>,
        error: Option<ResponseError>,
        value: Vec<Value>,
    ) -> Self {
        Self::Response {
            id,
            key: key.into(),
            typ: typ.into(),
            value,
            error,
        }
    }

    /// Serialisiert den Umschlag als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert einen Umschlag aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_serialisierung() {
        let umschlag = Envelope::notification("app", "focus", Vec::new());
        let wert: Value = serde_json::from_str(&umschlag.to_json().unwrap()).unwrap();
        assert_eq!(wert["action"], "notification");
        assert_eq!(wert["key"], "app");
        assert_eq!(wert["type"], "focus");
        assert_eq!(wert["value"], json!([]));
        assert!(wert.get("id").is_none());
    }

    #[test]
    fn request_round_trip() {
        let umschlag = Envelope::request(7, "config", "getConfig", vec![json!("file.txt")]);
        let json = umschlag.to_json().unwrap();
        let decoded = Envelope::from_json(&json).unwrap();
        assert_eq!(decoded, umschlag);
        if let Envelope::Request { id, key, typ, value } = decoded {
            assert_eq!(id, 7);
            assert_eq!(key, "config");
            assert_eq!(typ, "getConfig");
            assert_eq!(value, vec![json!("file.txt")]);
        } else {
            panic!("Erwartet Request-Umschlag");
        }
    }

    #[test]
    fn response_error_ist_null_bei_erfolg() {
        let umschlag = Envelope::response(7, "config", "getConfig", None, vec![json!("inhalt")]);
        let wert: Value = serde_json::from_str(&umschlag.to_json().unwrap()).unwrap();
        assert!(wert.as_object().unwrap().contains_key("error"));
        assert!(wert["error"].is_null());
        assert_eq!(wert["id"], 7);
        assert_eq!(wert["value"], json!(["inhalt"]));
    }

    #[test]
    fn response_ohne_error_feld_lesbar() {
        let json = r#"{"action":"response","id":3,"key":"config","type":"getConfig","value":[]}"#;
        let decoded = Envelope::from_json(json).unwrap();
        if let Envelope::Response { error, .. } = decoded {
            assert!(error.is_none());
        } else {
            panic!("Erwartet Response-Umschlag");
        }
    }

    #[test]
    fn response_mit_fehlerobjekt() {
        let fehler = ResponseError {
            code: 500,
            msg: Some("kaputt".into()),
            data: Some(json!({"detail": 1})),
            stack: None,
        };
        let umschlag = Envelope::response(9, "config", "setConfig", Some(fehler.clone()), vec![]);
        let decoded = Envelope::from_json(&umschlag.to_json().unwrap()).unwrap();
        if let Envelope::Response { error, .. } = decoded {
            assert_eq!(error, Some(fehler));
        } else {
            panic!("Erwartet Response-Umschlag");
        }
    }

    #[test]
    fn fehlerobjekt_laesst_optionale_felder_weg() {
        let fehler = ResponseError {
            code: 500,
            msg: None,
            data: None,
            stack: None,
        };
        let wert = serde_json::to_value(&fehler).unwrap();
        assert_eq!(wert, json!({"code": 500}));
    }

    #[test]
    fn generisch_hat_code_500() {
        let fehler = ResponseError::generisch("Unbekannte Kapabilitaet");
        assert_eq!(fehler.code, GENERISCHER_FEHLERCODE);
        assert_eq!(fehler.msg.as_deref(), Some("Unbekannte Kapabilitaet"));
        assert!(fehler.data.is_none());
        assert!(fehler.stack.is_none());
    }

    #[test]
    fn unbekannte_action_abgelehnt() {
        let json = r#"{"action":"broadcast","key":"app","type":"focus","value":[]}"#;
        assert!(Envelope::from_json(json).is_err());
    }

    #[test]
    fn wert_reihenfolge_bleibt_erhalten() {
        let umschlag = Envelope::notification(
            "compiler",
            "compilationFinished",
            vec![json!(true), json!({"contracts": {}}), json!("quelle.sol")],
        );
        let wert: Value = serde_json::from_str(&umschlag.to_json().unwrap()).unwrap();
        assert_eq!(wert["value"][0], json!(true));
        assert_eq!(wert["value"][1], json!({"contracts": {}}));
        assert_eq!(wert["value"][2], json!("quelle.sol"));
    }
}
