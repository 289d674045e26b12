//! Create a partial Mango index, then run a query that uses it.
//!
//! `cargo run --example create_index`

use mango_rs::{
    Client, CreateIndexRequest, FindRequest, IndexFields, IndexType, Selector, UseIndex,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let index = CreateIndexRequest {
        index: IndexFields {
            fields: vec!["year".to_string(), "title".to_string()],
            partial_filter_selector: Some(Selector::gt("year", 2010)),
        },
        ddoc: Some("movies-by-year".to_string()),
        name: Some("recent-movies".to_string()),
        index_type: Some(IndexType::Json),
    };

    let client = Client::new("http://127.0.0.1", 5984, "movies").with_index_args(index);
    let created = client.create_index().await?;
    println!("index {}: {:?} in {}", created.name, created.result, created.id);

    let args = FindRequest {
        selector: Selector::gt("year", 2015),
        use_index: Some(UseIndex::DesignDocumentAndName(
            "movies-by-year".to_string(),
            "recent-movies".to_string(),
        )),
        ..FindRequest::default()
    };
    let client = Client::new("http://127.0.0.1", 5984, "movies").with_find_args(args);
    let response = client.find().await?;
    println!("matched {} docs", response.docs.len());

    Ok(())
}
