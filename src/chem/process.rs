use crate::{Error, Result};
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of a finished collaborator process.
#[derive(Debug)]
pub(crate) struct ProcessOutput {
    pub stdout: String,
}

/// Spawns `command`, feeds it `input` on stdin and waits for it to exit.
///
/// The child is killed if the returned future is dropped, which covers both
/// the timeout and a cancelled request.
pub(crate) async fn run(
    label: &str,
    command: &str,
    args: &[String],
    env: &HashMap<String, String>,
    input: Option<&[u8]>,
    timeout: Option<Duration>,
) -> Result<ProcessOutput> {
    let mut cmd = Command::new(command);
    cmd.args(args);
    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    for (key, value) in env {
        cmd.env(key, value);
    }

    debug!("Spawning {} process: {} {:?}", label, command, args);

    let mut child = cmd
        .spawn()
        .map_err(|e| Error::upstream(format!("Failed to spawn {} process {}: {}", label, command, e)))?;

    let exchange = async move {
        if let Some(input) = input {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| Error::upstream(format!("Failed to get stdin for {} process", label)))?;
            stdin
                .write_all(input)
                .await
                .map_err(|e| Error::upstream(format!("Failed to write to {} process: {}", label, e)))?;
            // Closing stdin signals end of request.
            drop(stdin);
        }

        child
            .wait_with_output()
            .await
            .map_err(|e| Error::upstream(format!("Failed to wait for {} process: {}", label, e)))
    };

    // The limit covers feeding stdin as well as waiting for exit.
    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, exchange).await.map_err(|_| {
            warn!("{} process timed out after {:?}", label, limit);
            Error::upstream(format!("{} timed out after {}s", label, limit.as_secs_f64()))
        })??,
        None => exchange.await?,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::upstream(format!(
            "{} process exited with {}: {}",
            label,
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| Error::upstream(format!("{} produced non UTF-8 output: {}", label, e)))?;

    Ok(ProcessOutput { stdout })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_echoes_stdin() {
        let output = run("test", "sh", &sh("cat"), &HashMap::new(), Some(b"CCO"), None)
            .await
            .unwrap();
        assert_eq!(output.stdout, "CCO");
    }

    #[tokio::test]
    async fn test_passes_env() {
        let env = HashMap::from([("MOLSTRUCT_TEST_VAR".to_string(), "c1ccccc1".to_string())]);
        let output = run("test", "sh", &sh("printf %s \"$MOLSTRUCT_TEST_VAR\""), &env, None, None)
            .await
            .unwrap();
        assert_eq!(output.stdout, "c1ccccc1");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_upstream_error() {
        let err = run("toolkit", "sh", &sh("echo boom >&2; exit 3"), &HashMap::new(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_upstream_error() {
        let err = run(
            "recognizer",
            "/nonexistent/molstruct-binary",
            &[],
            &HashMap::new(),
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert!(err.to_string().contains("Failed to spawn recognizer"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let err = run(
            "recognizer",
            "sh",
            &sh("sleep 5"),
            &HashMap::new(),
            None,
            Some(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_timeout_covers_unread_stdin() {
        // Larger than any pipe buffer, and the child never reads it.
        let input = vec![b'x'; 1 << 20];
        let started = std::time::Instant::now();

        let err = run(
            "toolkit",
            "sh",
            &sh("sleep 5"),
            &HashMap::new(),
            Some(&input),
            Some(Duration::from_millis(200)),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
        assert!(err.to_string().contains("timed out"), "{}", err);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
