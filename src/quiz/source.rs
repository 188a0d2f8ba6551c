//! Fetching the vocabulary sheet.

use std::time::Duration;

use log::{error, info};

use crate::quiz::csv::parse_vocabulary;
use crate::quiz::{QuizError, WordPool};

fn unavailable(err: reqwest::Error) -> QuizError {
    QuizError::DataSourceUnavailable(err.to_string())
}

/// Downloads the CSV export at `url` and parses it into a pool.
pub async fn fetch_vocabulary(url: &str, timeout: Duration) -> Result<WordPool, QuizError> {
    info!("Loading vocabulary from {}", url);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(unavailable)?;

    let response = client.get(url).send().await.map_err(unavailable)?;
    let status = response.status();
    if !status.is_success() {
        error!("Vocabulary request failed with status {}", status);
        return Err(QuizError::DataSourceUnavailable(format!(
            "HTTP error! status: {}",
            status.as_u16()
        )));
    }

    let text = response.text().await.map_err(unavailable)?;
    let pool = WordPool::new(parse_vocabulary(&text)?);
    info!(
        "Loaded {} words ({} distinct)",
        pool.len(),
        pool.distinct_words()
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn loads_pool_from_export() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/export"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "Word,Meaning (Full)\nGato,Cat\nPerro,Dog\nGato,Cat\nSol,\"Sun, the star\"\n",
            ))
            .mount(&server)
            .await;

        let pool = fetch_vocabulary(&format!("{}/export", server.uri()), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.distinct_words(), 3);
        assert_eq!(pool.records()[3].meaning, "Sun, the star");
    }

    #[tokio::test]
    async fn http_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetch_vocabulary(&server.uri(), TIMEOUT).await.unwrap_err();
        assert_eq!(
            err,
            QuizError::DataSourceUnavailable("HTTP error! status: 503".into())
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_unavailable() {
        let err = fetch_vocabulary("http://127.0.0.1:1/export", TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::DataSourceUnavailable(_)));
    }

    #[tokio::test]
    async fn schema_errors_pass_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Term,Definition\na,b\n"))
            .mount(&server)
            .await;

        let err = fetch_vocabulary(&server.uri(), TIMEOUT).await.unwrap_err();
        assert_eq!(
            err,
            QuizError::MalformedSchema {
                missing: "Word".into()
            }
        );
    }

    #[tokio::test]
    async fn header_only_export_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Word,Meaning (Full)\n"))
            .mount(&server)
            .await;

        let err = fetch_vocabulary(&server.uri(), TIMEOUT).await.unwrap_err();
        assert_eq!(err, QuizError::EmptyDataset);
    }
}
