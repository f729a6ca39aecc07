//! Interactive question loop

use movierag_llm::ports::{ChatModel, Embedder};
use movierag_retrieval::{QuestionAnswerer, Reply};
use movierag_store::VectorIndex;
use std::io::{self, BufRead, Write};

use crate::errors;
use crate::output::write_pretty_json;

pub const PROMPT: &str = "Ask a question about movie plots: ";
pub const RESULT_HEADER: &str = "--- Result (JSON) ---";

/// What to do with one line of input
#[derive(Debug, PartialEq, Eq)]
enum Turn {
    Exit,
    Skip,
    Ask(String),
}

fn classify(line: &str) -> Turn {
    let trimmed = line.trim();

    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        Turn::Exit
    } else if trimmed.is_empty() {
        Turn::Skip
    } else {
        Turn::Ask(trimmed.to_string())
    }
}

/// Counts reported when a session ends
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub answered: usize,
    pub failed: usize,
}

/// Read questions from `input` until EOF, `exit` or `quit`, answering each on `out`
///
/// A failed question is reported and the loop carries on. Only I/O errors on
/// the session streams end it early.
pub fn run<E, C, I, R, W>(
    answerer: &QuestionAnswerer<E, C, I>,
    mut input: R,
    mut out: W,
) -> io::Result<SessionSummary>
where
    E: Embedder,
    C: ChatModel,
    I: VectorIndex,
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();

    loop {
        write!(out, "\n{}", PROMPT)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        let question = match classify(&line) {
            Turn::Exit => break,
            Turn::Skip => continue,
            Turn::Ask(question) => question,
        };

        writeln!(out, "Thinking...")?;
        out.flush()?;

        match answerer.answer(&question) {
            Ok(reply) => {
                write_reply(&mut out, &reply)?;
                summary.answered += 1;
            }
            Err(error) => {
                tracing::warn!(%error, "Question failed");
                writeln!(out, "An error occurred: {}", errors::from_domain(&error).render())?;
                summary.failed += 1;
            }
        }
    }

    tracing::info!(answered = summary.answered, failed = summary.failed, "Session ended");
    Ok(summary)
}

/// Print a reply under the result header as four-space-indented JSON
pub fn write_reply<W: Write>(mut out: W, reply: &Reply) -> io::Result<()> {
    writeln!(out, "\n{}", RESULT_HEADER)?;
    write_pretty_json(&mut out, reply)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use movierag_core::models::{Chunk, ChunkId, ChunkMetadata};
    use movierag_llm::mock::{HashingEmbedder, ScriptedChat};
    use movierag_retrieval::IndexBuilder;
    use movierag_store::FlatIndex;
    use std::io::Cursor;
    use std::sync::Arc;

    const REPLY: &str =
        r#"{"answer": "Neil McCauley", "contexts": ["McCauley"], "reasoning": "Named in the plot."}"#;

    type TestAnswerer = QuestionAnswerer<HashingEmbedder, Arc<ScriptedChat>, FlatIndex>;

    fn answerer(chat: Arc<ScriptedChat>) -> TestAnswerer {
        let embedder = HashingEmbedder::new(64);
        let chunks = vec![Chunk {
            id: ChunkId(0),
            text: "Neil McCauley leads a crew of thieves".to_string(),
            metadata: ChunkMetadata { title: "Heat".to_string(), release_year: Some(1995) },
        }];
        let index: FlatIndex = IndexBuilder::new(&embedder).build(chunks).unwrap();

        let mut answerer = QuestionAnswerer::new(embedder, chat, 3);
        answerer.attach(index);
        answerer
    }

    fn run_with(answerer: &TestAnswerer, input: &str) -> (SessionSummary, String) {
        let mut out = Vec::new();
        let summary = run(answerer, Cursor::new(input.to_string()), &mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("exit\n"), Turn::Exit);
        assert_eq!(classify("  QUIT  "), Turn::Exit);
        assert_eq!(classify("Exit"), Turn::Exit);
        assert_eq!(classify("   \n"), Turn::Skip);
        assert_eq!(classify("exit now"), Turn::Ask("exit now".to_string()));
        assert_eq!(classify(" who? \n"), Turn::Ask("who?".to_string()));
    }

    #[test]
    fn test_exit_without_asking() {
        let chat = Arc::new(ScriptedChat::new([REPLY]));
        let (summary, output) = run_with(&answerer(chat.clone()), "EXIT\nwho leads the crew?\n");

        assert_eq!(summary, SessionSummary::default());
        assert!(chat.prompts().is_empty());
        assert!(!output.contains("Thinking..."));
    }

    #[test]
    fn test_eof_ends_session() {
        let chat = Arc::new(ScriptedChat::new([REPLY]));
        let (summary, output) = run_with(&answerer(chat), "");

        assert_eq!(summary.answered, 0);
        assert!(output.contains(PROMPT));
    }

    #[test]
    fn test_answers_and_prints_json() {
        let chat = Arc::new(ScriptedChat::new([REPLY]));
        let input = "\n  \nWho leads the crew?\nquit\n";
        let (summary, output) = run_with(&answerer(chat.clone()), input);

        assert_eq!(summary, SessionSummary { answered: 1, failed: 0 });
        assert_eq!(chat.prompts().len(), 1);
        assert!(output.contains("Thinking...\n"));
        let expected = format!("{}\n{{\n    \"answer\": \"Neil McCauley\"", RESULT_HEADER);
        assert!(output.contains(&expected));
        assert_eq!(output.matches(PROMPT).count(), 4);
    }

    #[test]
    fn test_error_does_not_end_session() {
        let chat = Arc::new(ScriptedChat::new(["not json at all", REPLY]));
        let (summary, output) = run_with(&answerer(chat), "first question\nsecond question\n");

        assert_eq!(summary, SessionSummary { answered: 1, failed: 1 });
        assert!(output.contains("An error occurred: Model reply was not a valid answer"));
        assert!(output.contains("\"reasoning\": \"Named in the plot.\""));
    }

    #[test]
    fn test_not_ready_reply_is_printed() {
        let mut out = Vec::new();
        write_reply(&mut out, &Reply::NotReady).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("\n{}\n\"Please ingest data first.\"\n", RESULT_HEADER)
        );
    }
}
