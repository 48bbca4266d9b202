//! Document acquisition: local directories and the Archive.org collection.
//!
//! The collection is organised as individual "items", each holding PDFs from
//! one source domain. Three endpoints are involved:
//!   - the Advanced Search API to discover items in a collection
//!   - the Metadata API to list the files inside an item
//!   - direct download URLs (`https://archive.org/download/{id}/{file}`)
//!
//! The crawler is deliberately polite: it identifies itself, sleeps between
//! API calls, and samples a subset of each item's PDFs rather than mirroring
//! whole items. Individual download failures are per-document errors; only a
//! search that yields nothing at all is fatal.

use crate::config::CorpusConfig;
use crate::error::{CorpusError, DocumentError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const SEARCH_URL: &str = "https://archive.org/advancedsearch.php";
const USER_AGENT: &str = "slidecorpus/0.1 (educational research project)";

/// Items fetched per search page.
const SEARCH_ROWS: usize = 100;
/// Skip files larger than this (scanned-book blobs, not decks).
const MAX_FILE_BYTES: u64 = 50_000_000;
/// Skip files smaller than this (stubs and redirects).
const MIN_FILE_BYTES: u64 = 10_000;

/// One discovered collection item.
#[derive(Debug, Clone)]
pub struct ArchiveItem {
    pub identifier: String,
    pub title: String,
    pub size: u64,
}

/// One PDF inside an item.
#[derive(Debug, Clone)]
pub struct PdfFile {
    pub name: String,
    pub size: u64,
}

/// List the PDFs in a local directory, sorted by filename.
pub fn local_documents(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, CorpusError> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| CorpusError::SourceUnreadable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CorpusError::SourceUnreadable {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    debug!("Found {} PDFs in {}", paths.len(), dir.display());
    Ok(paths)
}

/// Downloads PDFs from an Archive.org collection.
pub struct ArchiveSource {
    client: reqwest::Client,
    download_dir: PathBuf,
    collection: String,
    request_delay: Duration,
}

impl ArchiveSource {
    /// Create a source writing into `download_dir`, creating it if needed.
    pub fn new(
        download_dir: impl Into<PathBuf>,
        collection: impl Into<String>,
        config: &CorpusConfig,
    ) -> Result<Self, CorpusError> {
        let download_dir = download_dir.into();
        std::fs::create_dir_all(&download_dir).map_err(|e| CorpusError::SourceUnreadable {
            path: download_dir.clone(),
            source: e,
        })?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(|e| CorpusError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            client,
            download_dir,
            collection: collection.into(),
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Search the collection for items, most-downloaded first.
    ///
    /// Pages through the search API until `max_items` items are found or a
    /// page comes back empty. A search that errors before finding anything
    /// is fatal; an error after partial results logs and returns what we
    /// have.
    pub async fn discover_items(
        &self,
        domain_filter: Option<&str>,
        max_items: usize,
    ) -> Result<Vec<ArchiveItem>, CorpusError> {
        let mut query = format!("collection:{}", self.collection);
        if let Some(domain) = domain_filter {
            query.push_str(&format!(" AND title:{domain}"));
        }
        info!("Searching Archive.org for items (query: {query})");

        let mut items: Vec<ArchiveItem> = Vec::new();
        let mut page = 1usize;

        while items.len() < max_items {
            let response = self
                .client
                .get(SEARCH_URL)
                .query(&[
                    ("q", query.as_str()),
                    ("fl[]", "identifier,title,item_size"),
                    ("sort[]", "downloads desc"),
                    ("rows", &SEARCH_ROWS.to_string()),
                    ("page", &page.to_string()),
                    ("output", "json"),
                ])
                .send()
                .await;

            let docs = match search_docs(response).await {
                Ok(docs) => docs,
                Err(reason) => {
                    if items.is_empty() {
                        return Err(CorpusError::SearchFailed { query, reason });
                    }
                    warn!("Search error after {} items: {reason}", items.len());
                    break;
                }
            };
            if docs.is_empty() {
                break;
            }

            for doc in docs {
                if let Some(identifier) = doc.get("identifier").and_then(Value::as_str) {
                    items.push(ArchiveItem {
                        identifier: identifier.to_string(),
                        title: doc
                            .get("title")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        size: json_u64(doc.get("item_size")),
                    });
                }
            }

            debug!("Found {} items so far (page {page})", items.len());
            page += 1;
            sleep(self.request_delay).await;
        }

        items.truncate(max_items);
        info!("Discovered {} items total", items.len());
        Ok(items)
    }

    /// List the PDF files inside one item via the Metadata API.
    ///
    /// Listing errors are not fatal — the caller just moves on to the next
    /// item, so failures log and return an empty list.
    pub async fn list_pdfs_in_item(&self, identifier: &str) -> Vec<PdfFile> {
        let url = format!("https://archive.org/metadata/{identifier}/files");
        let files = match self.fetch_json(&url).await {
            Ok(value) => value,
            Err(reason) => {
                warn!("Error listing files for {identifier}: {reason}");
                return Vec::new();
            }
        };

        // The endpoint returns either a bare array or {"result": [...]}.
        let files = match &files {
            Value::Array(list) => list.as_slice(),
            Value::Object(map) => map
                .get("result")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            _ => &[],
        };

        files
            .iter()
            .filter_map(|f| {
                let name = f.get("name").and_then(Value::as_str)?;
                if !name.to_lowercase().ends_with(".pdf") {
                    return None;
                }
                Some(PdfFile {
                    name: name.to_string(),
                    size: json_u64(f.get("size")),
                })
            })
            .collect()
    }

    /// Download one PDF to the download directory.
    ///
    /// The local name is `{identifier}__{filename}` with path separators
    /// flattened, so files from different items cannot collide. An existing
    /// file is reused without re-downloading. A failed or non-PDF download
    /// removes any partial file before returning.
    pub async fn download_pdf(
        &self,
        identifier: &str,
        filename: &str,
    ) -> Result<PathBuf, DocumentError> {
        let safe_name = format!("{identifier}__{filename}").replace('/', "_");
        let local_path = self.download_dir.join(&safe_name);

        if local_path.exists() {
            debug!("Already downloaded: {safe_name}");
            return Ok(local_path);
        }

        let url = format!("https://archive.org/download/{identifier}/{filename}");
        match self.fetch_pdf_bytes(&url, &local_path).await {
            Ok(()) => Ok(local_path),
            Err(detail) => {
                if local_path.exists() {
                    let _ = tokio::fs::remove_file(&local_path).await;
                }
                Err(DocumentError::DownloadFailed {
                    filename: filename.to_string(),
                    detail,
                })
            }
        }
    }

    /// Discover items, then walk them downloading up to `count` PDFs.
    ///
    /// Items are shuffled for variety, and only a sample of each item's PDFs
    /// is taken (some items hold hundreds). Returns the local paths of
    /// everything downloaded, including previously-downloaded files that
    /// were reused.
    pub async fn download_collection<R: Rng + ?Sized>(
        &self,
        count: usize,
        domain_filter: Option<&str>,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>, CorpusError> {
        // more items than needed, for variety
        let max_items = (count * 2).min(1000);
        let mut items = self.discover_items(domain_filter, max_items).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }
        items.shuffle(rng);

        let mut downloaded: Vec<PathBuf> = Vec::new();
        for item in &items {
            if downloaded.len() >= count {
                break;
            }
            sleep(self.request_delay).await;

            let pdfs = self.list_pdfs_in_item(&item.identifier).await;
            if pdfs.is_empty() {
                continue;
            }

            let sample_size = pdfs.len().min(((count - downloaded.len()) / 3).max(1));
            let sampled: Vec<&PdfFile> = pdfs.choose_multiple(rng, sample_size).collect();

            for pdf in sampled {
                if downloaded.len() >= count {
                    break;
                }
                if pdf.size > MAX_FILE_BYTES || pdf.size < MIN_FILE_BYTES {
                    debug!("Skipping {} ({} bytes)", pdf.name, pdf.size);
                    continue;
                }

                sleep(self.request_delay / 2).await;
                match self.download_pdf(&item.identifier, &pdf.name).await {
                    Ok(path) => {
                        info!(
                            "Downloaded {} ({}/{count})",
                            pdf.name,
                            downloaded.len() + 1
                        );
                        downloaded.push(path);
                    }
                    Err(e) => warn!("{e}"),
                }
            }
        }

        Ok(downloaded)
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        response.json().await.map_err(|e| e.to_string())
    }

    async fn fetch_pdf_bytes(&self, url: &str, local_path: &Path) -> Result<(), String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;

        // Magic-byte check: archive.org serves HTML error pages with 200s.
        if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
            return Err("response is not a PDF".to_string());
        }

        tokio::fs::write(local_path, &bytes)
            .await
            .map_err(|e| format!("write failed: {e}"))
    }
}

async fn search_docs(
    response: Result<reqwest::Response, reqwest::Error>,
) -> Result<Vec<Value>, String> {
    let response = response.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    let body: Value = response.json().await.map_err(|e| e.to_string())?;
    Ok(body
        .get("response")
        .and_then(|r| r.get("docs"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default())
}

/// Archive.org serialises sizes as either numbers or strings.
fn json_u64(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
