//! Prompt builders for the three analysis calls.
//!
//! The prompts are written in Polish, matching the training material and
//! the transcripts they analyze. Each builder returns a ready
//! [`CompletionRequest`]; only the report call uses JSON mode.

use cs_domain::report::IncidentReport;
use cs_providers::{ChatMessage, CompletionRequest};

/// Structured report extraction (JSON mode).
///
/// The current report is embedded so the model preserves already-confirmed
/// fields; the code-side merge enforces the same rule regardless of how
/// well the model follows it.
pub fn report_request(transcript: &str, current: &IncidentReport) -> CompletionRequest {
    let current_json = if current.is_empty() {
        "{}".to_owned()
    } else {
        current.to_json_string()
    };

    let prompt = format!(
        r#"Jesteś analizatorem zgłoszeń alarmowych. Utwórz obiekt JSON na podstawie poniższej transkrypcji rozmowy.

Obiekt JSON powinien zawierać następujące pola:
- reason: Krótki opis powodu zgłoszenia alarmowego (max kilka słów)
- place: Lokalizacja zdarzenia (jak najdokładniejszy adres)
- victims: Krótka informacja o poszkodowanych osobach i ich stanach
- important_level: Liczba całkowita od 1 do 5 określająca ważność zgłoszenia

Skala ważności:
1: Nie jest to sytuacja alarmowa, żart lub pomyłka
2-3: Sytuacje nie zagrażające życiu lub sprawy dla innych służb
4-5: Krytyczne sytuacje wymagające natychmiastowej uwagi operatora

WAŻNE: Otrzymujesz aktualny raport w formacie JSON. Jeśli jakiekolwiek pole w tym raporcie nie jest puste, NIE generuj nowej wartości dla tego pola, tylko ZACHOWAJ istniejącą wartość lub uzupełnij ją o dodatkowe informacje, jeśli to konieczne.

Aktualny raport:
{current_json}

Zwróć TYLKO poprawny obiekt JSON z tymi polami, bez dodatkowego tekstu.

Transkrypcja:
{transcript}"#
    );

    CompletionRequest {
        messages: vec![ChatMessage::user(prompt)],
        json_mode: true,
        ..Default::default()
    }
}

/// Narrative assessment of the caller's performance.
pub fn analysis_request(
    duration_seconds: i64,
    scenario: &str,
    transcript: &str,
) -> CompletionRequest {
    let prompt = format!(
        r#"Jesteś ekspertem analizującym rozmowy alarmowe. Przeanalizuj poniższą transkrypcję rozmowy alarmowej i przedstaw szczegółową ocenę.

Skup się na:
1. Wydobytych kluczowych informacjach (lokalizacja, charakter sytuacji awaryjnej, stan poszkodowanego itp.)
2. Jakości odpowiedzi osoby dzwoniącej (profesjonalizm, jasność, umiejętność przekazania informacji)
3. Przestrzeganiu scenariusza przez osobę dzwoniącą
4. Skuteczności przekazywania informacji
5. Obszarach doskonałości
6. Obszarach wymagających poprawy

Weź pod uwagę czas trwania rozmowy ({duration_seconds} sekund) i oceń, czy osoba dzwoniąca przekazała kluczowe informacje w odpowiednim czasie.

Scenariusz, którego powinna trzymać się osoba dzwoniąca:
{scenario}

Formatuj analizę jako ustrukturyzowaną ocenę z jasnymi sekcjami i punktami, gdzie to właściwe.

Transkrypcja rozmowy:
{transcript}"#
    );

    CompletionRequest {
        messages: vec![ChatMessage::user(prompt)],
        json_mode: false,
        ..Default::default()
    }
}

/// Short descriptive title, at most four words.
pub fn title_request(transcript: &str) -> CompletionRequest {
    let prompt = format!(
        r#"Jesteś asystentem, który tworzy zwięzłe, opisowe tytuły dla rozmów alarmowych.

Na podstawie transkrypcji rozmowy alarmowej między operatorem a dzwoniącym:
1. Utwórz krótki, informacyjny tytuł (maksymalnie 4 słowa)
2. Tytuł powinien ujmować główną sytuację awaryjną lub problem
3. Uwzględnij istotne szczegóły, takie jak lokalizacja lub powaga sytuacji, tylko jeśli są kluczowe
4. Format powinien być jasny i profesjonalny

Przykładowy format: "Zawał w Biurowcu" lub "Dziecko w Zamkniętym Samochodzie"

Transkrypcja rozmowy:
{transcript}"#
    );

    CompletionRequest {
        messages: vec![ChatMessage::user(prompt)],
        json_mode: false,
        ..Default::default()
    }
}
