#[cfg(test)]
mod pipeline_tests {
    use crate::browser::MockRenderEngine;
    use crate::{
        AppConfig, BrowserKind, DownloadConfig, EmbedClient, HeadlessBrowserConfig,
        TweetBatch, TweetProcessor, TweetshotError,
    };
    use std::path::{Path, PathBuf};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_config(download_dir: &Path) -> AppConfig {
        AppConfig {
            headless_browser: HeadlessBrowserConfig {
                name: BrowserKind::Chromium,
                executable_path: PathBuf::from("/usr/bin/chromium"),
                args: Vec::new(),
                screenshot_delay: 0,
            },
            download: DownloadConfig {
                path: download_dir.to_path_buf(),
                name: "{id}.png".to_string(),
                update: false,
            },
            twit_embed: None,
            postprocess: None,
        }
    }

    /// Minimal embed endpoint: 404 for any request mentioning `erroruser`,
    /// canned embed markup otherwise.
    async fn spawn_embed_stub() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();

                    let response = if request.contains("erroruser") {
                        let body = "Not Found";
                        format!(
                            "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\n\
                             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        )
                    } else {
                        let body =
                            r#"{"html": "<blockquote><p>it works</p></blockquote>"}"#;
                        format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        )
                    };
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}/oembed")
    }

    #[test]
    fn test_error_classification() {
        assert!(TweetshotError::remote_api("GET", "https://e", 404, "nope").is_recoverable());
        assert!(TweetshotError::Render("boom".to_string()).is_recoverable());
        assert!(TweetshotError::ImageProcessing("bad".to_string()).is_recoverable());
        assert!(!TweetshotError::Validation("bad".to_string()).is_recoverable());
    }

    #[test]
    fn test_should_skip_requires_existing_image_and_no_update() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("42.png"), "png").unwrap();

        let mut config = test_config(dir.path());
        let make = |config: AppConfig| {
            TweetProcessor::with_parts(
                config,
                Box::new(MockRenderEngine::new()),
                EmbedClient::with_endpoint("http://127.0.0.1:9/oembed"),
            )
        };

        let mut tweet = crate::Tweet::from_url("https://twitter.com/nasa/status/42").unwrap();
        let processor = make(config.clone());
        assert!(!processor.should_skip(&tweet));

        tweet.image = "42.png".to_string();
        assert!(processor.should_skip(&tweet));

        tweet.image = "missing.png".to_string();
        assert!(!processor.should_skip(&tweet));

        tweet.image = "42.png".to_string();
        config.download.update = true;
        let processor = make(config);
        assert!(!processor.should_skip(&tweet));
    }

    #[tokio::test]
    async fn test_skipped_record_touches_neither_embed_nor_engine() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("42.png"), "png").unwrap();

        let mut engine = MockRenderEngine::new();
        engine.expect_render().times(0);
        engine.expect_screenshot().times(0);
        engine.expect_extract_text().times(0);

        // An unroutable embed endpoint: any fetch attempt would error out
        // and fail the record.
        let mut processor = TweetProcessor::with_parts(
            test_config(dir.path()),
            Box::new(engine),
            EmbedClient::with_endpoint("http://127.0.0.1:9/oembed"),
        );

        let mut tweet = crate::Tweet::from_url("https://twitter.com/nasa/status/42").unwrap();
        tweet.image = "42.png".to_string();
        let batch = TweetBatch {
            tweets: vec![tweet.clone()],
        };

        let updated = processor.process_batch(batch).await;
        assert_eq!(updated.tweets, vec![tweet]);
    }

    #[tokio::test]
    async fn test_batch_continues_past_failed_record() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = spawn_embed_stub().await;

        let mut engine = MockRenderEngine::new();
        engine.expect_render().times(1).returning(|_| Ok(()));
        engine.expect_screenshot().times(1).returning(|_, _| Ok(()));
        engine
            .expect_extract_text()
            .returning(|_| Some("it works".to_string()));

        let mut processor = TweetProcessor::with_parts(
            test_config(dir.path()),
            Box::new(engine),
            EmbedClient::with_endpoint(endpoint),
        );

        let batch = TweetBatch::from_urls(&[
            "https://twitter.com/erroruser/status/13",
            "https://twitter.com/nasa/status/42",
        ])
        .unwrap();

        let updated = processor.process_batch(batch).await;
        assert_eq!(updated.tweets.len(), 2);

        // First record failed with a 404 and is preserved unmodified.
        assert_eq!(updated.tweets[0].url, "https://twitter.com/erroruser/status/13");
        assert!(updated.tweets[0].image.is_empty());
        assert!(updated.tweets[0].text.is_empty());

        // Second record went through the whole pipeline.
        assert_eq!(updated.tweets[1].url, "https://twitter.com/nasa/status/42");
        assert_eq!(updated.tweets[1].image, "42.png");
        assert_eq!(updated.tweets[1].text, "it works");
    }

    #[tokio::test]
    async fn test_remote_failure_carries_request_context() {
        let endpoint = spawn_embed_stub().await;
        let client = EmbedClient::with_endpoint(endpoint);

        let err = client
            .fetch_embed_html("https://twitter.com/erroruser/status/13", &Default::default())
            .await
            .unwrap_err();

        match err {
            TweetshotError::RemoteApi {
                method,
                url,
                status,
                body,
            } => {
                assert_eq!(method, "GET");
                assert_eq!(status, 404);
                assert_eq!(body, "Not Found");
                assert!(url.contains("url=https"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_fetch_returns_markup() {
        let endpoint = spawn_embed_stub().await;
        let client = EmbedClient::with_endpoint(endpoint);

        let html = client
            .fetch_embed_html("https://twitter.com/nasa/status/42", &Default::default())
            .await
            .unwrap();
        assert_eq!(html, "<blockquote><p>it works</p></blockquote>");
    }
}
