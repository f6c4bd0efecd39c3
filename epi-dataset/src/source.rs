use anyhow::Context;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_TRIES: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const INITIAL_BACKOFF_MILLIS: u64 = 1000;

/// Where the source files live.
#[derive(Debug, Clone)]
pub enum SourceRoot {
    /// A local copy of the data tree
    Directory(PathBuf),
    /// The data tree served over HTTP; every file is fetched with up to
    /// `max_tries` attempts and exponential backoff between them
    Remote {
        client: Client,
        base_url: String,
        max_tries: u32,
    },
}

impl SourceRoot {
    pub fn directory(path: impl Into<PathBuf>) -> SourceRoot {
        SourceRoot::Directory(path.into())
    }

    pub fn remote(base_url: &str, max_tries: u32, timeout: Duration) -> anyhow::Result<SourceRoot> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(SourceRoot::Remote {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tries: max_tries.max(1),
        })
    }

    /// Full path or URL of a source file, for messages.
    pub fn locate(&self, relative_path: &str) -> String {
        match self {
            SourceRoot::Directory(dir) => dir.join(relative_path).display().to_string(),
            SourceRoot::Remote { base_url, .. } => format!("{}/{}", base_url, relative_path),
        }
    }

    /// Read one source file.
    ///
    /// `Ok(None)` means the file does not exist (a missing file or a 404);
    /// any other failure is an error.
    pub async fn fetch(&self, relative_path: &str) -> anyhow::Result<Option<String>> {
        match self {
            SourceRoot::Directory(dir) => {
                let path = dir.join(relative_path);
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => Ok(Some(text)),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
                }
            }
            SourceRoot::Remote {
                client, max_tries, ..
            } => fetch_with_retry(client, &self.locate(relative_path), *max_tries).await,
        }
    }
}

/// GET `url`, retrying failed attempts with exponential backoff. A 404 is
/// an answer, not a failure, and is not retried.
async fn fetch_with_retry(client: &Client, url: &str, max_tries: u32) -> anyhow::Result<Option<String>> {
    let mut sleep_millis = INITIAL_BACKOFF_MILLIS;
    let mut last_error = anyhow::anyhow!("no attempt made");

    for attempt in 1..=max_tries {
        match client.get(url).send().await {
            Ok(response) if response.status() == StatusCode::NOT_FOUND => return Ok(None),
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => return Ok(Some(body)),
                Err(e) => {
                    warn!(
                        "Attempt {}/{}: Failed to read response body for {}: {}",
                        attempt, max_tries, url, e
                    );
                    last_error = e.into();
                }
            },
            Ok(response) => {
                warn!(
                    "Attempt {}/{}: Bad response status for {}: {}",
                    attempt,
                    max_tries,
                    url,
                    response.status()
                );
                last_error = anyhow::anyhow!("bad response status {}", response.status());
            }
            Err(e) => {
                warn!("Attempt {}/{}: Request failed for {}: {}", attempt, max_tries, url, e);
                last_error = e.into();
            }
        }

        if attempt < max_tries {
            info!("Sleeping for {} milliseconds before retry for {}", sleep_millis, url);
            tokio::time::sleep(Duration::from_millis(sleep_millis)).await;
            sleep_millis *= 2;
        }
    }

    Err(last_error.context(format!("all {} attempts failed for {}", max_tries, url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_root() -> SourceRoot {
        SourceRoot::directory(concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/sample"))
    }

    #[tokio::test]
    async fn test_directory_fetch() {
        let root = sample_root();
        let text = root.fetch("locations.csv").await.unwrap().unwrap();
        assert!(text.starts_with("abbreviation,location"));
        assert_eq!(root.fetch("no/such/file.csv").await.unwrap(), None);
    }

    #[test]
    fn test_remote_urls_are_joined_once() {
        let root = SourceRoot::remote("https://example.org/data/", 0, Duration::from_secs(1)).unwrap();
        assert_eq!(root.locate("thresholds.csv"), "https://example.org/data/thresholds.csv");
        match root {
            SourceRoot::Remote { max_tries, .. } => assert_eq!(max_tries, 1),
            SourceRoot::Directory(_) => panic!("expected a remote root"),
        }
    }
}
