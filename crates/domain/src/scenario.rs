//! Built-in training scenario catalogue.
//!
//! Each scenario is a short Polish briefing the trainee must act out when
//! reporting the emergency. The session only ever sees the description as
//! opaque text, so swapping in an external catalogue stays trivial.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// One training scenario: a title for catalogue display and the briefing
/// handed to the trainee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: u32,
    pub title: String,
    pub description: String,
}

/// All built-in scenarios, in catalogue order.
pub fn all() -> Vec<Scenario> {
    BUILTIN
        .iter()
        .enumerate()
        .map(|(i, (title, description))| Scenario {
            id: i as u32 + 1,
            title: (*title).to_owned(),
            description: (*description).to_owned(),
        })
        .collect()
}

/// Look up a scenario by its catalogue id.
pub fn by_id(id: u32) -> Option<Scenario> {
    all().into_iter().find(|s| s.id == id)
}

/// Pick a random scenario for a new training call.
pub fn random() -> Scenario {
    let scenarios = all();
    scenarios
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| scenarios[0].clone())
}

const BUILTIN: &[(&str, &str)] = &[
    (
        "Wypadek samochodowy",
        "Zgłoś wypadek samochodowy na ulicy Głównej. Są dwie osoby ranne, a ruch drogowy jest zablokowany.",
    ),
    (
        "Pożar domu",
        "Zgłoś pożar domu. Dym widoczny jest z drugiego piętra i możliwe, że w środku są uwięzieni ludzie.",
    ),
    (
        "Nagły przypadek medyczny",
        "Zgłoś osobę, która zasłabła w parku. Osoba jest nieprzytomna, ale oddycha.",
    ),
    (
        "Wyciek gazu",
        "Zgłoś silny zapach gazu w swoim budynku mieszkalnym. Kilku mieszkańców odczuwa zawroty głowy.",
    ),
    (
        "Powódź",
        "Zgłoś zalanie w swojej okolicy po intensywnych opadach deszczu. Woda wdziera się do domów, a niektóre ulice są nieprzejezdne.",
    ),
    (
        "Zaginiona osoba",
        "Zgłoś zaginięcie dziecka, które ostatnio widziano w lokalnym centrum handlowym. 8-letnie dziecko miało na sobie czerwoną koszulkę i niebieskie dżinsy.",
    ),
    (
        "Napad",
        "Zgłoś napad, który właśnie miał miejsce w sklepie spożywczym. Podejrzany uciekł pieszo w kierunku centrum.",
    ),
    (
        "Awaria prądu",
        "Zgłoś rozległą awarię zasilania, która dotknęła całą okolicę podczas ekstremalnych warunków pogodowych.",
    ),
];
