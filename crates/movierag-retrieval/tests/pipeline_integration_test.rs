//! End-to-end tests of the offline pipeline
//!
//! CSV -> chunks -> index -> disk -> index -> answer, using the hashing
//! embedder and a scripted chat model so no network is needed.

use movierag_core::loader::read_records;
use movierag_core::processing::{chunk_records, ChunkConfig};
use movierag_llm::mock::{HashingEmbedder, ScriptedChat};
use movierag_retrieval::{open_index, IndexBuilder, QuestionAnswerer, Reply, Retriever};
use movierag_store::{FlatIndex, VectorIndex};
use std::sync::Arc;
use tempfile::TempDir;

const DATASET: &str = "\
Release Year,Title,Origin/Ethnicity,Director,Cast,Genre,Wiki Page,Plot
1995,Heat,American,Michael Mann,Al Pacino,crime,https://example.org/heat,\"A crew of professional thieves led by Neil McCauley robs an armored car. Detective Vincent Hanna hunts them across Los Angeles.\"
1979,Alien,American,Ridley Scott,Sigourney Weaver,science fiction,https://example.org/alien,\"The crew of the commercial spaceship Nostromo answers a distress call and brings a deadly creature aboard.\"
2001,Amelie,French,Jean-Pierre Jeunet,Audrey Tautou,comedy,https://example.org/amelie,\"A shy waitress in Montmartre decides to secretly change the lives of the people around her in Paris.\"
2002,Untitled,American,Nobody,Nobody,drama,https://example.org/none,
";

fn build_index(embedder: &HashingEmbedder) -> FlatIndex {
    let report = read_records(DATASET.as_bytes(), 500).unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.skipped, 1);

    let chunks = chunk_records(&report.records, &ChunkConfig::new(60, 10).unwrap()).unwrap();
    assert!(chunks.len() > 3);

    IndexBuilder::new(embedder).with_batch_size(2).build(chunks).unwrap()
}

#[test]
fn test_saved_index_answers_like_fresh_index() {
    let dir = TempDir::new().unwrap();
    let embedder = HashingEmbedder::new(128);

    let fresh = build_index(&embedder);
    fresh.save(dir.path()).unwrap();
    let reloaded: FlatIndex = open_index(dir.path(), &embedder).unwrap().unwrap();

    let questions =
        ["Who robs the armored car?", "What comes aboard the spaceship?", "waitress in Paris"];
    for question in questions {
        let before = Retriever::new(&embedder, &fresh).query(question, 3).unwrap();
        let after = Retriever::new(&embedder, &reloaded).query(question, 3).unwrap();
        assert_eq!(before, after);
    }
}

#[test]
fn test_retrieval_finds_matching_movie() {
    let embedder = HashingEmbedder::new(256);
    let index = build_index(&embedder);

    let results =
        Retriever::new(&embedder, &index).query("distress call spaceship creature", 1).unwrap();

    assert_eq!(results[0].chunk.metadata.title, "Alien");
    assert_eq!(results[0].chunk.metadata.release_year, Some(1979));
}

#[test]
fn test_question_answerer_end_to_end() {
    let dir = TempDir::new().unwrap();
    let embedder = HashingEmbedder::new(256);
    build_index(&embedder).save(dir.path()).unwrap();

    let chat = Arc::new(ScriptedChat::new([
        "```json\n{\"answer\": \"Neil McCauley\", \"contexts\": [\"led by Neil McCauley\"], \"reasoning\": \"Named in the Heat plot.\"}\n```",
    ]));
    let mut answerer = QuestionAnswerer::new(embedder.clone(), chat.clone(), 3);
    assert_eq!(answerer.answer("Who leads the thieves?").unwrap(), Reply::NotReady);

    let index: FlatIndex = open_index(dir.path(), &embedder).unwrap().unwrap();
    answerer.attach(index);

    let reply = answerer.answer("Who leads the crew of thieves?").unwrap();
    let answer = reply.answer().unwrap();
    assert_eq!(answer.answer, "Neil McCauley");
    assert_eq!(answer.contexts, vec!["led by Neil McCauley".to_string()]);

    let user = &chat.prompts()[0].user;
    assert!(user.starts_with("Context:\nMovie: "));
    assert_eq!(user.matches("\nPlot: ").count(), 3);
    assert!(user.ends_with("\n\nQuestion: Who leads the crew of thieves?"));
}
