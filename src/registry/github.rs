use anyhow::{bail, Context, Result};
use base64::Engine as _;
use reqwest::Client;
use serde_json::Value;

/// A license successfully retrieved from `GET /repos/{owner}/{repo}/license`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedLicense {
    /// SPDX identifier reported by the API; `UNKNOWN` when unrecognized.
    pub spdx_id: String,
    /// Full license text, base64-decoded from the response body.
    pub text: String,
    /// Browser URL of the license file.
    pub html_url: String,
}

/// Extract the `owner/repo` key from a repository URL.
///
/// Only `github.com` hosts resolve; any other host, or a path with fewer than
/// two segments, yields `None` (the collector-agnostic "cannot resolve"
/// outcome).
pub fn extract_repo_path(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))
        .or_else(|| url.strip_prefix("https://www.github.com/"))?;

    let mut segments = rest.trim_matches('/').split('/');
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let repo = segments.next().filter(|s| !s.is_empty())?;
    Some(format!("{}/{}", owner, repo.trim_end_matches(".git")))
}

/// Fetch the published license for a repository from the GitHub API.
///
/// The bearer token is optional; its absence only lowers the rate limit. No
/// retries are attempted: a throttled or failed response surfaces as `Err`
/// and the caller degrades per-entry.
pub async fn fetch_license(
    client: &Client,
    repo_url: &str,
    token: Option<&str>,
) -> Result<Option<FetchedLicense>> {
    let Some(repo_path) = extract_repo_path(repo_url) else {
        return Ok(None);
    };

    let url = format!("https://api.github.com/repos/{}/license", repo_path);
    let mut request = client
        .get(&url)
        .header("User-Agent", "license-fetchr/0.1.0 (license aggregation tool)")
        .header("Accept", "application/vnd.github.v3+json");
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        bail!("GitHub API returned {} for {}", response.status(), url);
    }

    let data: Value = response.json().await?;
    parse_license_response(&data).map(Some)
}

/// Decode the JSON body of the license endpoint.
fn parse_license_response(data: &Value) -> Result<FetchedLicense> {
    let encoded = data
        .get("content")
        .and_then(|v| v.as_str())
        .context("license response has no content field")?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.replace(['\n', '\r'], ""))
        .context("license content is not valid base64")?;
    let text = String::from_utf8(bytes).context("license content is not valid UTF-8")?;

    let spdx_id = data
        .get("license")
        .and_then(|l| l.get("spdx_id"))
        .and_then(|s| s.as_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let html_url = data
        .get("html_url")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    Ok(FetchedLicense {
        spdx_id,
        text,
        html_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_owner_repo() {
        assert_eq!(
            extract_repo_path("https://github.com/acme/widget"),
            Some("acme/widget".to_string())
        );
        assert_eq!(
            extract_repo_path("https://github.com/astral-sh/uv"),
            Some("astral-sh/uv".to_string())
        );
        // extra path segments and .git suffixes are trimmed to owner/repo
        assert_eq!(
            extract_repo_path("https://github.com/serde-rs/serde/tree/master"),
            Some("serde-rs/serde".to_string())
        );
        assert_eq!(
            extract_repo_path("https://github.com/serde-rs/serde.git"),
            Some("serde-rs/serde".to_string())
        );
    }

    #[test]
    fn test_non_github_hosts_yield_no_match() {
        assert_eq!(extract_repo_path("https://gitlab.com/x/y"), None);
        assert_eq!(extract_repo_path("https://developer.nvidia.com/cuquantum-sdk"), None);
        assert_eq!(extract_repo_path("https://github.com.evil.com/a/b"), None);
        assert_eq!(extract_repo_path(""), None);
    }

    #[test]
    fn test_malformed_paths_yield_no_match() {
        assert_eq!(extract_repo_path("https://github.com/acme"), None);
        assert_eq!(extract_repo_path("https://github.com/"), None);
    }

    #[test]
    fn test_parse_license_response() {
        let data = serde_json::json!({
            "license": {"spdx_id": "MIT"},
            "content": "TUlUIExpY2Vuc2UKClBlcm1pc3Npb24gaXMgaGVyZWJ5IGdyYW50ZWQuLi4=",
            "html_url": "https://github.com/astral-sh/uv/blob/main/LICENSE"
        });

        let license = parse_license_response(&data).unwrap();
        assert_eq!(license.spdx_id, "MIT");
        assert!(license.text.starts_with("MIT License"));
        assert_eq!(
            license.html_url,
            "https://github.com/astral-sh/uv/blob/main/LICENSE"
        );
    }

    #[test]
    fn test_parse_tolerates_missing_spdx_id() {
        let data = serde_json::json!({
            "content": "TUlUIExpY2Vuc2UKClBlcm1pc3Npb24gaXMgaGVyZWJ5IGdyYW50ZWQuLi4="
        });
        let license = parse_license_response(&data).unwrap();
        assert_eq!(license.spdx_id, "UNKNOWN");
    }

    #[test]
    fn test_parse_rejects_missing_content() {
        let data = serde_json::json!({"license": {"spdx_id": "MIT"}});
        assert!(parse_license_response(&data).is_err());
    }
}
