//! HTTP JSON fetch with a command-line fallback.
//!
//! Corporate proxies and TLS-intercepting middleboxes routinely break the
//! native client while the system `curl` binary, which picks up the host
//! proxy and certificate configuration, still gets through. [`RetryingFetcher`]
//! tries the native client first and shells out to `curl` once on failure.
//! When both fail, the caller sees the native error.

use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{FcxError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    http: reqwest::Client,
    fallback_cmd: String,
}

impl RetryingFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FcxError::Network)?;

        Ok(Self {
            http,
            fallback_cmd: "curl".to_string(),
        })
    }

    /// Override the fallback transfer command. Used by tests to stand in a
    /// scripted binary for `curl`.
    pub fn with_fallback_command(mut self, cmd: impl Into<String>) -> Self {
        self.fallback_cmd = cmd.into();
        self
    }

    /// Perform an authenticated GET returning parsed JSON.
    ///
    /// A non-2xx status or a client error triggers exactly one fallback
    /// attempt through the transfer command; a failed fallback re-surfaces
    /// the original native error, never the fallback's own.
    pub async fn fetch_json(&self, url: &str, headers: &[(String, String)]) -> Result<Value> {
        let native_err = match self.fetch_native(url, headers).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        warn!(url, error = %native_err, "native fetch failed, trying {}", self.fallback_cmd);

        match self.fetch_fallback(url, headers).await {
            Ok(value) => Ok(value),
            Err(fallback_err) => {
                debug!(url, error = %fallback_err, "fallback fetch failed");
                Err(native_err)
            }
        }
    }

    async fn fetch_native(&self, url: &str, headers: &[(String, String)]) -> Result<Value> {
        let mut request = self.http.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(FcxError::Network)?;
        let status = response.status();
        let body = response.text().await.map_err(FcxError::Network)?;

        if !status.is_success() {
            return Err(FcxError::api(Some(status), body_summary(&body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| FcxError::malformed(format!("response body is not JSON: {e}")))
    }

    async fn fetch_fallback(&self, url: &str, headers: &[(String, String)]) -> Result<Value> {
        let mut cmd = Command::new(&self.fallback_cmd);
        // -s -S: silent except for diagnostics; -L: follow redirects;
        // --fail: non-2xx exits non-zero instead of printing the error body.
        cmd.arg("-s").arg("-S").arg("-L").arg("--fail");
        for (name, value) in headers {
            cmd.arg("-H").arg(format!("{name}: {value}"));
        }
        cmd.arg(url);
        cmd.stdin(Stdio::null());

        let output = cmd
            .output()
            .await
            .map_err(|e| FcxError::Config(format!("failed to spawn {}: {e}", self.fallback_cmd)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        evaluate_fallback_output(&stdout, &stderr, output.status.success())
    }
}

/// Decide whether a fallback invocation produced usable JSON.
///
/// Empty stdout, a non-zero exit, or a diagnostic stream mentioning an error
/// all count as fallback failure; the caller then re-surfaces the native
/// error.
fn evaluate_fallback_output(stdout: &str, stderr: &str, exit_ok: bool) -> Result<Value> {
    if !exit_ok {
        return Err(FcxError::Config(format!(
            "fallback transfer exited with failure: {}",
            first_line(stderr)
        )));
    }

    if stdout.trim().is_empty() {
        return Err(FcxError::Config(
            "fallback transfer produced no output".to_string(),
        ));
    }

    let diagnostics = stderr.to_ascii_lowercase();
    if !diagnostics.trim().is_empty()
        && (diagnostics.contains("error") || diagnostics.contains("fail"))
    {
        return Err(FcxError::Config(format!(
            "fallback transfer reported: {}",
            first_line(stderr)
        )));
    }

    serde_json::from_str(stdout)
        .map_err(|e| FcxError::Config(format!("fallback output is not JSON: {e}")))
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

fn body_summary(body: &str) -> String {
    let line = first_line(body);
    if line.chars().count() > 300 {
        let truncated: String = line.chars().take(300).collect();
        format!("{truncated}…")
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_rejects_empty_stdout() {
        let result = evaluate_fallback_output("", "", true);
        assert!(matches!(result, Err(FcxError::Config(_))));
    }

    #[test]
    fn fallback_rejects_error_diagnostics() {
        let result = evaluate_fallback_output("{\"ok\":true}", "curl: (22) HTTP error 403", true);
        assert!(matches!(result, Err(FcxError::Config(_))));
    }

    #[test]
    fn fallback_tolerates_benign_diagnostics() {
        let value =
            evaluate_fallback_output("{\"ok\":true}", "  % Total  % Received", true).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn fallback_rejects_non_json_stdout() {
        let result = evaluate_fallback_output("<html>403</html>", "", true);
        assert!(matches!(result, Err(FcxError::Config(_))));
    }

    #[test]
    fn fallback_rejects_failed_exit() {
        let result = evaluate_fallback_output("{\"ok\":true}", "curl: (7) refused", false);
        assert!(matches!(result, Err(FcxError::Config(_))));
    }

    #[cfg(unix)]
    mod with_scripted_fallback {
        use super::*;
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        // Unroutable without DNS or a listener; fails fast.
        const DEAD_URL: &str = "http://127.0.0.1:9/v1/files/abc";

        fn script(dir: &tempfile::TempDir, body: &str) -> String {
            let path = dir.path().join("fake-curl.sh");
            let mut file = std::fs::File::create(&path).expect("create script");
            writeln!(file, "#!/bin/sh").unwrap();
            writeln!(file, "{body}").unwrap();
            let mut perms = file.metadata().unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[tokio::test]
        async fn fallback_json_recovers_from_native_failure() {
            let dir = tempfile::tempdir().expect("tempdir");
            let fetcher = RetryingFetcher::with_timeout(Duration::from_secs(2))
                .unwrap()
                .with_fallback_command(script(&dir, "echo '{\"name\":\"Doc\"}'"));

            let value = fetcher.fetch_json(DEAD_URL, &[]).await.expect("fallback");
            assert_eq!(value["name"], "Doc");
        }

        #[tokio::test]
        async fn empty_fallback_output_surfaces_native_error() {
            let dir = tempfile::tempdir().expect("tempdir");
            let fetcher = RetryingFetcher::with_timeout(Duration::from_secs(2))
                .unwrap()
                .with_fallback_command(script(&dir, "true"));

            let err = fetcher.fetch_json(DEAD_URL, &[]).await.unwrap_err();
            assert!(
                matches!(err, FcxError::Network(_)),
                "expected the original native error, got {err:?}"
            );
        }

        #[tokio::test]
        async fn noisy_fallback_stderr_surfaces_native_error() {
            let dir = tempfile::tempdir().expect("tempdir");
            let fetcher = RetryingFetcher::with_timeout(Duration::from_secs(2))
                .unwrap()
                .with_fallback_command(script(
                    &dir,
                    "echo '{\"ok\":true}'; echo 'TLS error: bad cert' >&2",
                ));

            let err = fetcher.fetch_json(DEAD_URL, &[]).await.unwrap_err();
            assert!(matches!(err, FcxError::Network(_)));
        }
    }
}
