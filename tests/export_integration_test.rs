use anyhow::Result;
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;
use wikitext_export::adapters::datasets_server::DatasetRef;
use wikitext_export::adapters::open_source;
use wikitext_export::{
    CliConfig, DatasetsServerSource, ExportEngine, ExportError, LineExporter, LocalStorage,
    VecSource,
};

fn wikitext_train() -> DatasetRef {
    DatasetRef {
        dataset: "Salesforce/wikitext".to_string(),
        config: "wikitext-103-v1".to_string(),
        split: "train".to_string(),
    }
}

fn rows_body(rows: Vec<serde_json::Value>, total: u64) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| serde_json::json!({"row_idx": i, "row": row, "truncated_cells": []}))
        .collect();
    serde_json::json!({"features": [{"feature_idx": 0, "name": "text"}], "rows": rows, "num_rows_total": total})
}

#[tokio::test]
async fn test_end_to_end_export_from_datasets_server() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rows")
            .query_param("dataset", "Salesforce/wikitext")
            .query_param("config", "wikitext-103-v1")
            .query_param("split", "train")
            .query_param("offset", "0");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(rows_body(
                vec![
                    serde_json::json!({"text": "a\nb"}),
                    serde_json::json!({"text": "c"}),
                    serde_json::json!({"text": "d\ne\nf"}),
                ],
                3,
            ));
    });

    let source =
        DatasetsServerSource::new(&server.base_url(), wikitext_train(), Duration::from_secs(5))?;
    let storage = LocalStorage::new(temp_dir.path());
    let exporter = LineExporter::new(source, storage, "text", "wikitext103_train.txt");
    let mut engine = ExportEngine::new_with_monitoring(exporter, false);

    let summary = engine.run().await?;

    api_mock.assert();
    let contents = std::fs::read_to_string(temp_dir.path().join("wikitext103_train.txt"))?;
    assert_eq!(contents, "a b\nc\nd e f\n");
    assert_eq!(summary.records_written, 3);
    assert!(summary.output_path.ends_with("wikitext103_train.txt"));
    Ok(())
}

#[tokio::test]
async fn test_empty_split_produces_empty_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rows");
        then.status(200).json_body(rows_body(vec![], 0));
    });

    let source =
        DatasetsServerSource::new(&server.base_url(), wikitext_train(), Duration::from_secs(5))?;
    let mut engine = ExportEngine::new(LineExporter::new(
        source,
        LocalStorage::new(temp_dir.path()),
        "text",
        "empty.txt",
    ));

    let summary = engine.run().await?;

    let path = temp_dir.path().join("empty.txt");
    assert!(path.exists());
    assert_eq!(std::fs::metadata(&path)?.len(), 0);
    assert_eq!(summary.records_written, 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_field_leaves_prefix_on_disk() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let first_page = server.mock(|when, then| {
        when.method(GET).path("/rows").query_param("offset", "0");
        then.status(200).json_body(rows_body(
            vec![
                serde_json::json!({"text": " = Valkyria Chronicles III = \n"}),
                serde_json::json!({"text": null}),
                serde_json::json!({"text": "unreached"}),
            ],
            10,
        ));
    });
    let later_pages = server.mock(|when, then| {
        when.method(GET).path("/rows").query_param("offset", "3");
        then.status(200).json_body(rows_body(vec![], 10));
    });

    let source =
        DatasetsServerSource::new(&server.base_url(), wikitext_train(), Duration::from_secs(5))?;
    let mut engine = ExportEngine::new(LineExporter::new(
        source,
        LocalStorage::new(temp_dir.path()),
        "text",
        "partial.txt",
    ));

    let err = engine.run().await.unwrap_err();

    assert!(matches!(
        err,
        ExportError::FieldMissing {
            record_index: 1,
            ..
        }
    ));
    first_page.assert();
    later_pages.assert_hits(0);
    let contents = std::fs::read_to_string(temp_dir.path().join("partial.txt"))?;
    assert_eq!(contents, " = Valkyria Chronicles III =  \n");
    Ok(())
}

#[tokio::test]
async fn test_failed_second_page_keeps_first_page_lines() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let first_page = server.mock(|when, then| {
        when.method(GET)
            .path("/rows")
            .query_param("offset", "0")
            .query_param("length", "2");
        then.status(200).json_body(rows_body(
            vec![
                serde_json::json!({"text": " = Robert Boulter = \n"}),
                serde_json::json!({"text": "Robert Boulter is an English film actor ."}),
            ],
            5,
        ));
    });
    let second_page = server.mock(|when, then| {
        when.method(GET).path("/rows").query_param("offset", "2");
        then.status(500)
            .json_body(serde_json::json!({"error": "Unexpected error."}));
    });

    let source =
        DatasetsServerSource::new(&server.base_url(), wikitext_train(), Duration::from_secs(5))?
            .with_page_size(2);
    let mut engine = ExportEngine::new(LineExporter::new(
        source,
        LocalStorage::new(temp_dir.path()),
        "text",
        "truncated.txt",
    ));

    let err = engine.run().await.unwrap_err();

    first_page.assert();
    second_page.assert();
    match &err {
        ExportError::AcquisitionFailure { message } => {
            assert!(message.contains("500"), "{}", message);
            assert!(message.contains("offset 2"), "{}", message);
        }
        other => panic!("expected AcquisitionFailure, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 2);
    let contents = std::fs::read_to_string(temp_dir.path().join("truncated.txt"))?;
    assert_eq!(
        contents,
        " = Robert Boulter =  \nRobert Boulter is an English film actor .\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_unknown_split_fails_acquisition() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/rows").query_param("split", "nope");
        then.status(404)
            .json_body(serde_json::json!({"error": "The split does not exist."}));
    });

    let dataset = DatasetRef {
        split: "nope".to_string(),
        ..wikitext_train()
    };
    let source = DatasetsServerSource::new(&server.base_url(), dataset, Duration::from_secs(5))?;
    let mut engine = ExportEngine::new(LineExporter::new(
        source,
        LocalStorage::new(temp_dir.path()),
        "text",
        "out.txt",
    ));

    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, ExportError::AcquisitionFailure { .. }));
    assert_eq!(err.exit_code(), 2);
    Ok(())
}

#[tokio::test]
async fn test_line_count_and_order_hold_for_mixed_records() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let texts: Vec<String> = (0..250)
        .map(|i| match i % 4 {
            0 => format!("row {}", i),
            1 => format!("row {}\n", i),
            2 => format!("\nrow\n\n{}", i),
            _ => String::new(),
        })
        .collect();

    let source = VecSource::from_texts("text", texts.clone());
    let exporter =
        LineExporter::new(source, LocalStorage::new(temp_dir.path()), "text", "mixed.txt")
            .with_progress_interval(100);
    let mut engine = ExportEngine::new(exporter);

    let summary = engine.run().await?;

    let contents = std::fs::read_to_string(temp_dir.path().join("mixed.txt"))?;
    let lines: Vec<&str> = contents.split_terminator('\n').collect();
    assert_eq!(lines.len(), texts.len());
    assert_eq!(summary.records_written, texts.len() as u64);
    for (line, text) in lines.iter().zip(&texts) {
        assert_eq!(*line, text.replace('\n', " "));
    }
    Ok(())
}

#[tokio::test]
async fn test_open_source_prefers_local_jsonl() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("rows.jsonl");
    std::fs::write(&input, "{\"text\": \"x\\ny\"}\n{\"text\": \"z\"}\n")?;

    let config = CliConfig {
        endpoint: "http://127.0.0.1:1".to_string(),
        ..CliConfig::default()
    };
    let source = open_source(&config, Some(input.as_path())).await?;
    let mut engine = ExportEngine::new(LineExporter::new(
        source,
        LocalStorage::new(temp_dir.path()),
        "text",
        "from_jsonl.txt",
    ));

    engine.run().await?;

    let contents = std::fs::read_to_string(temp_dir.path().join("from_jsonl.txt"))?;
    assert_eq!(contents, "x y\nz\n");
    Ok(())
}
