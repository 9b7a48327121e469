//! GitHub REST Client
//!
//! Repository metadata, the recursive tree and file contents. Tokens are
//! optional; without one the anonymous rate limit applies.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::SourceHost;
use crate::constants::network;
use crate::types::{GlanceError, NodeKind, RepoId, RepoMeta, Result, TreeNode};

const TOKEN_PREFIXES: &[&str] = &["ghp_", "gho_", "ghu_", "ghs_", "ghr_", "github_pat_"];

/// Only tokens shaped like real GitHub tokens are sent
pub fn is_valid_token(token: &str) -> bool {
    let t = token.trim();
    t.len() > 20 && TOKEN_PREFIXES.iter().any(|p| t.starts_with(p))
}

/// `https://github.com/<owner>/<repo>[/...]`, trailing `.git` stripped
pub fn parse_github_url(input: &str) -> Result<RepoId> {
    let invalid = || GlanceError::InvalidRepoUrl(input.to_string());

    let url = Url::parse(input.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    match url.host_str() {
        Some("github.com") | Some("www.github.com") => {}
        _ => return Err(invalid()),
    }

    let mut segments = url.path_segments().ok_or_else(invalid)?.filter(|s| !s.is_empty());
    let owner = segments.next().ok_or_else(invalid)?;
    let repo = segments.next().ok_or_else(invalid)?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepoId::new(owner, repo))
}

// =============================================================================
// Client
// =============================================================================

pub struct GitHubClient {
    client: reqwest::Client,
    api_base: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GitHubClient {
    /// `token` falls back to `GITHUB_TOKEN`; malformed tokens are ignored
    pub fn new(api_base: &str, token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|e| GlanceError::Config(format!("Invalid GitHub API base '{}': {}", api_base, e)))?;

        let token = token
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| {
                let ok = is_valid_token(t);
                if !ok && !t.trim().is_empty() {
                    warn!("Ignoring GitHub token that does not look like a real token");
                }
                ok
            })
            .map(|t| SecretString::from(t.trim().to_string()));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(network::USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base,
            token,
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| GlanceError::Config("GitHub API base cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn repo_endpoint<'a>(
        &self,
        repo: &'a RepoId,
        rest: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url> {
        self.endpoint(
            ["repos", repo.owner.as_str(), repo.repo.as_str()]
                .into_iter()
                .chain(rest),
        )
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        debug!(%url, "GitHub request");
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }
        Ok(request.send().await?)
    }
}

/// Map a non-success response to a user-facing `Upstream` error
fn upstream_error(status: StatusCode, headers: &HeaderMap, not_found: &str) -> GlanceError {
    let code = status.as_u16();
    match status {
        StatusCode::NOT_FOUND => GlanceError::upstream(code, not_found),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
            let reset = header("x-ratelimit-reset").and_then(|v| v.parse::<i64>().ok());
            match (header("x-ratelimit-remaining"), reset) {
                (Some("0"), Some(reset)) => {
                    let seconds = (reset - chrono::Utc::now().timestamp()).max(0);
                    let minutes = (seconds + 59) / 60;
                    GlanceError::upstream(
                        code,
                        format!(
                            "GitHub API rate limit reached. Try again in {} minutes, or add a GitHub token to increase your limit.",
                            minutes
                        ),
                    )
                }
                _ => GlanceError::upstream(
                    code,
                    "GitHub API access forbidden. You may need a token for this repository.",
                ),
            }
        }
        _ => GlanceError::upstream(
            code,
            format!(
                "GitHub API error: {} {}",
                code,
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string(),
        ),
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn fetch_repo_meta(&self, repo: &RepoId) -> Result<RepoMeta> {
        let response = self.get(self.repo_endpoint(repo, [])?).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(
                status,
                response.headers(),
                "Repository not found. Check the URL or provide a GitHub token for private repos.",
            ));
        }

        let body: RepoResponse = response.json().await?;
        info!(repo = %repo, branch = %body.default_branch, "Repository metadata loaded");

        Ok(RepoMeta {
            id: repo.clone(),
            description: body.description.unwrap_or_default(),
            default_branch: body.default_branch,
            stars: body.stargazers_count,
            language: body.language.unwrap_or_default(),
        })
    }

    async fn fetch_tree(&self, repo: &RepoId, branch: &str) -> Result<Vec<TreeNode>> {
        let mut url = self.repo_endpoint(repo, ["git", "trees", branch])?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(
                status,
                response.headers(),
                "Failed to fetch repository tree: branch not found.",
            ));
        }

        let body: TreeResponse = response.json().await?;
        if body.truncated {
            warn!(repo = %repo, "GitHub tree was truncated; this is a very large repository");
        }

        Ok(body
            .tree
            .into_iter()
            .map(|entry| TreeNode {
                kind: if entry.entry_type == "tree" {
                    NodeKind::Folder
                } else {
                    NodeKind::File
                },
                path: entry.path,
                sha: entry.sha,
                size: entry.size,
            })
            .collect())
    }

    async fn fetch_file(&self, repo: &RepoId, path: &str) -> Result<Vec<u8>> {
        let url = self.repo_endpoint(repo, std::iter::once("contents").chain(path.split('/')))?;
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(
                status,
                response.headers(),
                &format!("File not found: {}", path),
            ));
        }

        let body: ContentsResponse = response.json().await.map_err(|_| {
            GlanceError::upstream(status.as_u16(), format!("{} is not a regular file", path))
        })?;

        if body.encoding.as_deref() == Some("base64")
            && let Some(encoded) = body.content.as_deref().filter(|c| !c.is_empty())
        {
            let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
            return general_purpose::STANDARD.decode(compact).map_err(|e| {
                GlanceError::upstream(status.as_u16(), format!("Invalid file encoding: {}", e))
            });
        }

        if matches!(body.entry_type.as_str(), "symlink" | "submodule") {
            return Ok(format!("[This is a {}, not a regular file]", body.entry_type).into_bytes());
        }

        // Large files come without inline content
        if let Some(download_url) = body.download_url {
            debug!(path, "Falling back to raw download");
            let raw = self.client.get(&download_url).send().await?;
            if raw.status().is_success() {
                return Ok(raw.bytes().await?.to_vec());
            }
        }

        Err(GlanceError::upstream(
            422,
            "Unable to read file content. It may be a binary file.",
        ))
    }
}

// Response types

#[derive(Debug, Deserialize)]
struct RepoResponse {
    description: Option<String>,
    default_branch: String,
    #[serde(default)]
    stargazers_count: u64,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    sha: String,
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(rename = "type")]
    entry_type: String,
    encoding: Option<String>,
    content: Option<String>,
    download_url: Option<String>,
}
