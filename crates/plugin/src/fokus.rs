//! Fokus-Zustandsmaschine
//!
//! Verfolgt welches Plugin (hoechstens eines) aktuell den Fokus haelt:
//! `Unfokussiert` oder `FokussiertAuf(titel)`, Startzustand ist
//! `Unfokussiert`. Der Fokus-Token wird ausschliesslich hier mutiert,
//! ausgeloest durch das tabChanged-Ereignis des Hosts.

use parking_lot::RwLock;

/// Ergebnis eines Fokus-Wechsels
///
/// `entfokussiert` nennt den vorherigen Halter falls er den Fokus
/// verliert, `fokussiert` das Ziel falls es eine Fokus-Nachricht erhalten
/// soll. Die Zustellung uebernimmt der Aufrufer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FokusWechsel {
    pub entfokussiert: Option<String>,
    pub fokussiert: Option<String>,
}

/// Fokus-Zustandsmaschine
pub struct FokusMaschine {
    aktuell: RwLock<Option<String>>,
    /// Token rueckt nur auf registrierte Plugins vor
    nur_registrierte: bool,
}

impl FokusMaschine {
    pub fn neu(nur_registrierte: bool) -> Self {
        Self {
            aktuell: RwLock::new(None),
            nur_registrierte,
        }
    }

    /// Aktueller Fokus-Halter, falls vorhanden
    pub fn aktueller(&self) -> Option<String> {
        self.aktuell.read().clone()
    }

    /// Fuehrt einen Tab-Wechsel aus und liefert die faelligen Uebergaenge
    ///
    /// Der vorherige Halter wird entfokussiert sobald das Ziel ein anderer
    /// Tab ist, auch wenn er selbst nicht mehr registriert ist (die
    /// Zustellung verpufft dann). Das Ziel wird nur fokussiert wenn es
    /// registriert ist; der Token rueckt trotzdem auf das Ziel vor, sodass
    /// der Fokus auch auf einen Tab ohne Plugin zeigen kann. Im Modus
    /// `nur_registrierte` bleibt bei einem unregistrierten Ziel alles
    /// unveraendert. Ein Wechsel auf den bereits fokussierten Tab sendet
    /// den Fokus erneut, aber keinen Entfokus.
    pub fn wechseln(&self, ziel: &str, ziel_registriert: bool) -> FokusWechsel {
        if self.nur_registrierte && !ziel_registriert {
            return FokusWechsel::default();
        }

        let mut aktuell = self.aktuell.write();
        let entfokussiert = match aktuell.as_deref() {
            Some(vorheriger) if vorheriger != ziel => Some(vorheriger.to_string()),
            _ => None,
        };
        let fokussiert = ziel_registriert.then(|| ziel.to_string());
        *aktuell = Some(ziel.to_string());

        FokusWechsel {
            entfokussiert,
            fokussiert,
        }
    }
}
