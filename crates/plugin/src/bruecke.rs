//! Ereignis-Bruecke – uebersetzt Host-Ereignisse in Plugin-Nachrichten
//!
//! Der Host besitzt drei benannte Ereignis-Stroeme (Kompilierung beendet,
//! neue Transaktion, Tab gewechselt). Die Bruecke abonniert jeden Strom
//! genau einmal und speist die Ereignisse in den [`ZustellRouter`];
//! eigenen Zustand haelt sie nicht. Zwischen den Stroemen ist keine
//! Reihenfolge garantiert.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::warn;

use werkbank_protocol::Envelope;

use crate::router::ZustellRouter;
use crate::types::{AusfuehrungsBackend, AusfuehrungsKontext};

/// Ein benannter Ereignis-Strom des Hosts (Observer-Muster)
///
/// Einmal abonnieren, beliebig oft ausloesen.
pub struct EreignisStrom<T> {
    beobachter: RwLock<Vec<Box<dyn Fn(&T) + Send + Sync>>>,
}

impl<T> EreignisStrom<T> {
    pub fn neu() -> Self {
        Self {
            beobachter: RwLock::new(Vec::new()),
        }
    }

    /// Registriert einen Beobachter
    pub fn abonnieren(&self, beobachter: impl Fn(&T) + Send + Sync + 'static) {
        self.beobachter.write().push(Box::new(beobachter));
    }

    /// Loest das Ereignis fuer alle Beobachter aus
    pub fn ausloesen(&self, wert: &T) {
        for beobachter in self.beobachter.read().iter() {
            beobachter(wert);
        }
    }
}

impl<T> Default for EreignisStrom<T> {
    fn default() -> Self {
        Self::neu()
    }
}

/// Ergebnis eines Kompilierungslaufs des Hosts
#[derive(Debug, Clone)]
pub struct KompilierungBeendet {
    pub erfolg: bool,
    pub daten: Value,
    pub quelle: Value,
}

/// Die drei Ereignis-Stroeme die der Host besitzt
#[derive(Default)]
pub struct HostEreignisse {
    pub kompilierung_beendet: EreignisStrom<KompilierungBeendet>,
    pub neue_transaktion: EreignisStrom<Value>,
    pub tab_gewechselt: EreignisStrom<String>,
}

impl HostEreignisse {
    pub fn neu() -> Self {
        Self::default()
    }
}

/// Verbindet Router und Host-Ereignisse
pub fn verbinden(
    router: Arc<ZustellRouter>,
    ereignisse: &HostEreignisse,
    kontext: Arc<dyn AusfuehrungsKontext>,
) {
    // compilationFinished geht nur an das fokussierte Plugin
    let r = Arc::clone(&router);
    ereignisse.kompilierung_beendet.abonnieren(move |ereignis| {
        let Some(fokus) = r.fokus_titel() else { return };
        let werte = vec![
            Value::Bool(ereignis.erfolg),
            ereignis.daten.clone(),
            ereignis.quelle.clone(),
        ];
        if let Err(fehler) = r.benachrichtigen(&fokus, "compiler", "compilationFinished", werte) {
            warn!(%fehler, "compilationFinished nicht zustellbar");
        }
    });

    // newTransaction wird nur im virtuellen Backend weitergereicht,
    // dann aber als Rundruf an alle registrierten Plugins
    let r = Arc::clone(&router);
    ereignisse.neue_transaktion.abonnieren(move |transaktion| {
        if kontext.aktives_backend() != AusfuehrungsBackend::Virtuell {
            return;
        }
        let umschlag =
            Envelope::notification("txlistener", "newTransaction", vec![transaktion.clone()]);
        if let Err(fehler) = r.rundruf(&umschlag) {
            warn!(%fehler, "newTransaction nicht zustellbar");
        }
    });

    // tabChanged treibt die Fokus-Maschine
    ereignisse.tab_gewechselt.abonnieren(move |tab| {
        if let Err(fehler) = router.tab_gewechselt(tab) {
            warn!(%fehler, "Tab-Wechsel nicht zustellbar");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kapabilitaet::KapabilitaetsTabelle;
    use crate::router::RouterKonfiguration;
    use crate::types::{PluginBeschreibung, PluginKanal};
    use parking_lot::Mutex;
    use serde_json::json;

    struct TestKanal {
        empfangen: Mutex<Vec<String>>,
    }

    impl TestKanal {
        fn neu() -> Arc<Self> {
            Arc::new(Self {
                empfangen: Mutex::new(Vec::new()),
            })
        }

        fn nachrichten(&self) -> Vec<Value> {
            self.empfangen
                .lock()
                .iter()
                .map(|payload| serde_json::from_str(payload).unwrap())
                .collect()
        }

        fn anzahl(&self) -> usize {
            self.empfangen.lock().len()
        }
    }

    impl PluginKanal for TestKanal {
        fn senden(&self, payload: &str, _ziel_origin: &str) {
            self.empfangen.lock().push(payload.to_string());
        }
    }

    struct FesterKontext(AusfuehrungsBackend);

    impl AusfuehrungsKontext for FesterKontext {
        fn aktives_backend(&self) -> AusfuehrungsBackend {
            self.0
        }
    }

    fn aufbau(
        backend: AusfuehrungsBackend,
    ) -> (Arc<ZustellRouter>, HostEreignisse, Arc<TestKanal>, Arc<TestKanal>) {
        let router = ZustellRouter::neu(KapabilitaetsTabelle::neu(), RouterKonfiguration::default());
        let ereignisse = HostEreignisse::neu();
        verbinden(Arc::clone(&router), &ereignisse, Arc::new(FesterKontext(backend)));

        let a = TestKanal::neu();
        let b = TestKanal::neu();
        router.registrieren(PluginBeschreibung::neu("a", "https://a"), a.clone());
        router.registrieren(PluginBeschreibung::neu("b", "https://b"), b.clone());
        (router, ereignisse, a, b)
    }

    #[test]
    fn strom_erreicht_mehrere_beobachter() {
        let strom = EreignisStrom::<u32>::neu();
        let gezaehlt = Arc::new(Mutex::new(0u32));
        for _ in 0..3 {
            let zaehler = Arc::clone(&gezaehlt);
            strom.abonnieren(move |wert| *zaehler.lock() += *wert);
        }
        strom.ausloesen(&5);
        assert_eq!(*gezaehlt.lock(), 15);
    }

    #[test]
    fn kompilierung_geht_nur_an_den_fokus() {
        let (_, ereignisse, a, b) = aufbau(AusfuehrungsBackend::Virtuell);
        ereignisse.tab_gewechselt.ausloesen(&"a".to_string());

        ereignisse.kompilierung_beendet.ausloesen(&KompilierungBeendet {
            erfolg: true,
            daten: json!({"contracts": {}}),
            quelle: json!("a.sol"),
        });

        let nachrichten = a.nachrichten();
        assert_eq!(nachrichten.len(), 2);
        assert_eq!(
            nachrichten[1],
            json!({
                "action": "notification",
                "key": "compiler",
                "type": "compilationFinished",
                "value": [true, {"contracts": {}}, "a.sol"]
            })
        );
        assert_eq!(b.anzahl(), 0);
    }

    #[test]
    fn kompilierung_ohne_fokus_ist_noop() {
        let (_, ereignisse, a, b) = aufbau(AusfuehrungsBackend::Virtuell);

        ereignisse.kompilierung_beendet.ausloesen(&KompilierungBeendet {
            erfolg: false,
            daten: Value::Null,
            quelle: Value::Null,
        });

        assert_eq!(a.anzahl(), 0);
        assert_eq!(b.anzahl(), 0);
    }

    #[test]
    fn transaktion_im_virtuellen_backend_geht_an_alle() {
        let (_, ereignisse, a, b) = aufbau(AusfuehrungsBackend::Virtuell);
        // Fokus liegt auf "a"; der Rundruf ignoriert das
        ereignisse.tab_gewechselt.ausloesen(&"a".to_string());

        ereignisse.neue_transaktion.ausloesen(&json!({"hash": "0x1"}));

        let erwartet = json!({
            "action": "notification",
            "key": "txlistener",
            "type": "newTransaction",
            "value": [{"hash": "0x1"}]
        });
        assert_eq!(a.nachrichten().last().unwrap(), &erwartet);
        assert_eq!(b.nachrichten(), vec![erwartet]);
    }

    #[test]
    fn transaktion_im_externen_backend_wird_nicht_weitergereicht() {
        let (_, ereignisse, a, b) = aufbau(AusfuehrungsBackend::Extern);

        ereignisse.neue_transaktion.ausloesen(&json!({"hash": "0x1"}));

        assert_eq!(a.anzahl(), 0);
        assert_eq!(b.anzahl(), 0);
    }

    #[test]
    fn tab_ereignis_treibt_die_fokus_maschine() {
        let (router, ereignisse, a, _) = aufbau(AusfuehrungsBackend::Virtuell);

        ereignisse.tab_gewechselt.ausloesen(&"a".to_string());

        assert_eq!(router.fokus_titel().as_deref(), Some("a"));
        assert_eq!(a.nachrichten()[0]["type"], "focus");
    }
}
