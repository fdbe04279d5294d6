//! Extraction of a ranking from an arbitrary page through a chat-completions
//! API, for sites no adapter exists for.
//!
//! The model is asked for a `position,game_title` CSV; anything else in its
//! answer (an explanation why the page holds no ranking, for instance) is an
//! extraction error.

use crate::data_structs::GameEntry;
use crate::error::*;
#[cfg(feature = "http-client")]
use crate::http_client::Downloader;
use crate::scrapers::finish_entries;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::{json, Value};

pub const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const MODEL: &str = "gpt-4o";

/// Pages are cut to this many characters before being sent.
const MAX_HTML_CHARS: usize = 200_000;

const SYSTEM_PROMPT: &str = "You are an assistant that extracts lists of games from HTML pages.";

const USER_PROMPT: &str = "From this HTML, extract the list of best games, keeping the position \
                           each game appears at in the list. Answer with a CSV file with the \
                           columns position and game_title. If the list has no positions or \
                           ranking, answer 'this list is invalid' and explain why. HTML:\n";

/// The request body asking the model to extract a ranking from `html`.
pub fn build_request(html: &str) -> Value {
    let html = match html.char_indices().nth(MAX_HTML_CHARS) {
        Some((cut, _)) => &html[..cut],
        None => html
    };

    json!({
        "model": MODEL,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": format!("{}{}", USER_PROMPT, html) }
        ],
        "temperature": 0.2
    })
}

/// The text of the first choice of a chat-completions response.
pub fn completion_content(response: &Value) -> Result<String> {
    match response["choices"][0]["message"]["content"].as_str() {
        Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
        _ => bail!(ErrorKind::ExtractionError("a reply from the completions API".into()))
    }
}

/// Strips a Markdown code fence around the CSV, if the model added one.
fn unfence(content: &str) -> &str {
    let trimmed = content.trim();

    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let body = match trimmed.find('\n') {
        Some(i) => &trimmed[i + 1..],
        None => ""
    };

    body.trim_end().trim_end_matches("```").trim()
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

/// Parses the model's `position,game_title` CSV into entries.
pub fn parse_completion_csv(content: &str) -> Result<Vec<GameEntry>> {
    let csv_text = unfence(content);
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers = rdr.headers()?.clone();
    let columns = (
        find_column(&headers, &["position"]),
        find_column(&headers, &["game_title", "title"])
    );

    let (pos_col, title_col) = match columns {
        (Some(p), Some(t)) => (p, t),
        _ => {
            let first_line = csv_text.lines().next().unwrap_or_default();
            bail!(ErrorKind::ExtractionError(format!("a ranking, the model answered: {}", first_line)))
        }
    };

    let mut entries = vec![];

    for record in rdr.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping extracted row: {}", e);
                continue;
            }
        };

        let position = record.get(pos_col).and_then(|p| p.parse::<u32>().ok());
        let title = record.get(title_col).map(str::trim).filter(|t| !t.is_empty());

        match (position, title) {
            (Some(position), Some(title)) if position > 0 => {
                entries.push(GameEntry::new(position, title));
            }
            _ => warn!("Skipping extracted row: {:?}", record)
        }
    }

    finish_entries("extracted", entries)
}

/// Downloads `url` and has the completions API extract its ranking.
#[cfg(feature = "http-client")]
pub fn extract_from_url(dl: &Downloader, api_key: &str, url: &str) -> Result<Vec<GameEntry>> {
    info!("Fetching HTML from {}", url);
    let html = dl.get_string(url)?;

    info!("Requesting extraction from {}", MODEL);
    let response = dl.post_json(COMPLETIONS_URL, api_key, &build_request(&html))?;

    parse_completion_csv(&completion_content(&response)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_shape() {
        let body = build_request("<h2>1. Zelda</h2>");

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][1]["content"].as_str().unwrap().ends_with("<h2>1. Zelda</h2>"));
    }

    #[test]
    fn long_pages_are_cut() {
        let html = "é".repeat(MAX_HTML_CHARS + 10);
        let body = build_request(&html);
        let content = body["messages"][1]["content"].as_str().unwrap();

        assert_eq!(content.chars().count(), USER_PROMPT.chars().count() + MAX_HTML_CHARS);
    }

    #[test]
    fn parses_fenced_csv() {
        let content = "```csv\nposition,game_title\n2,\"Half-Life: \"\"Episode,\"\" Two\"\n1,Zelda\nx,Broken\n```";
        let entries = parse_completion_csv(content).unwrap();

        assert_eq!(
            entries,
            vec![
                GameEntry::new(1, "Zelda"),
                GameEntry::new(2, r#"Half-Life: "Episode," Two"#)
            ]
        );
    }

    #[test]
    fn refusal_is_an_extraction_error() {
        let err = parse_completion_csv("This list is invalid: it has no ranking.").unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Parse);
        assert!(err.to_string().contains("This list is invalid"));
    }

    #[test]
    fn reads_first_choice() {
        let response = json!({ "choices": [{ "message": { "content": "position,game_title\n1,Zelda" } }] });
        assert_eq!(completion_content(&response).unwrap(), "position,game_title\n1,Zelda");

        assert!(completion_content(&json!({ "error": "quota" })).is_err());
    }
}
