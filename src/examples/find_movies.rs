//! Query a local CouchDB with a typed Mango selector.
//!
//! Run with a CouchDB listening on 127.0.0.1:5984 and a `movies` database:
//! `cargo run --example find_movies`

use mango_rs::{Client, FindRequest, Selector, SortSpec};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = FindRequest {
        selector: Selector::and([
            Selector::gte("year", 2000),
            Selector::ne("genre", "documentary"),
        ]),
        limit: Some(10),
        sort: Some(vec![SortSpec::desc("year")]),
        fields: Some(vec!["_id".to_string(), "title".to_string(), "year".to_string()]),
        execution_stats: Some(true),
        ..FindRequest::default()
    };

    let client = Client::new("http://127.0.0.1", 5984, "movies").with_find_args(args);
    let response = client.find().await?;

    for doc in &response.docs {
        println!("{doc}");
    }
    if let Some(stats) = response.execution_stats {
        println!(
            "examined {} docs in {:.1} ms",
            stats.total_docs_examined, stats.execution_time_ms
        );
    }
    if let Some(bookmark) = response.bookmark {
        println!("next page bookmark: {bookmark}");
    }

    Ok(())
}
