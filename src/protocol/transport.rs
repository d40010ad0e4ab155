//! JSON-lines transport: one request per input line, one response per output line.

use super::message::{Request, Response};
use super::router::route;
use crate::error::Result;
use crate::search::{GeometryProvider, SearchEngine};
use std::io::{BufRead, Write};

/// Serve requests from `reader` until EOF.
///
/// Malformed lines get a failure response and the loop keeps going.
pub fn serve<G, R, W>(engine: &mut SearchEngine<G>, reader: R, mut writer: W) -> Result<usize>
where
    G: GeometryProvider,
    R: BufRead,
    W: Write,
{
    let mut handled = 0;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => route(engine, request),
            Err(e) => {
                log::warn!("rejected malformed request: {e}");
                Response::rejected(format!("Malformed request: {e}"))
            }
        };
        serde_json::to_writer(&mut writer, &response)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        handled += 1;
    }
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::markup;
    use crate::search::position_map::fake::FakeGeometry;
    use serde_json::Value;
    use std::io::Cursor;

    fn run(source: &str, input: &str) -> Vec<Value> {
        let mut engine = SearchEngine::new(markup::parse(source), FakeGeometry::new(100.0, 10.0));
        let mut output = Vec::new();
        serve(&mut engine, Cursor::new(input.to_string()), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_session_over_lines() {
        let input = r#"{"type":"SEARCH","data":{"pattern":"o","flags":"g","maxMatches":10}}
{"type":"NAVIGATE","data":{"direction":"last"}}

{"type":"CLEAR_HIGHLIGHTS"}
{"type":"NAVIGATE","data":{"direction":"next"}}
"#;
        let responses = run("<p>foo boo</p>", input);
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["count"], 4);
        assert_eq!(responses[1]["index"], 3);
        assert_eq!(responses[2]["success"], true);
        assert_eq!(responses[3]["index"], -1);
    }

    #[test]
    fn test_malformed_line_does_not_stop_loop() {
        let input = "not json\n{\"type\":\"CLEAR_HIGHLIGHTS\"}\n";
        let responses = run("<p>x</p>", input);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["success"], false);
        assert_eq!(responses[1]["success"], true);
    }
}
