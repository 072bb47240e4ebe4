//! Directory and name operations: CWD/PWD, MKD, RMD, RNFR/RNTO, DELE

use crate::commands::FtpCommand;
use crate::error::{FtpError, Result};
use crate::list::NodeKind;
use crate::response::StatusCode;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

use super::FtpClient;

/// Extract the path between the first pair of double quotes of a PWD reply
/// (`257 "/pub" is the current directory`)
fn quoted_path(message: &str) -> Option<String> {
    let start = message.find('"')?;
    let rest = &message[start + 1..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

impl FtpClient {
    /// Change the working directory and confirm it with PWD
    ///
    /// Empty paths and `"."` are rejected. On success,
    /// [`working_directory`](Self::working_directory) reflects the server's
    /// canonical answer.
    pub async fn change_working_directory(&mut self, path: &str) -> Result<()> {
        if path.is_empty() || path == "." {
            return Err(FtpError::InvalidPath(path.to_string()));
        }
        let channel = self.authenticated_channel()?;

        channel
            .send_command(&FtpCommand::Cwd(path.to_string()))
            .await?
            .require_success()?;

        let reply = channel
            .send_command(&FtpCommand::Pwd)
            .await?
            .require_success()?;
        self.state.working_directory = quoted_path(&reply.message)
            .ok_or_else(|| FtpError::InvalidReply(reply.message.clone()))?;
        debug!("working directory is now {}", self.state.working_directory);
        Ok(())
    }

    /// Create a directory, making intermediate segments as needed
    ///
    /// Single-segment paths are a bare MKD. Deeper paths walk segment by
    /// segment: CWD probes each one and MKD fills the gaps (550 means the
    /// segment is missing). Absolute paths start the walk from `/`. The
    /// prior working directory is restored afterwards.
    pub async fn create_directory(&mut self, path: &str) -> Result<()> {
        let channel = self.authenticated_channel()?;

        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if segments.is_empty() {
            return Err(FtpError::InvalidPath(path.to_string()));
        }
        let absolute = path.starts_with('/');
        let original = self.state.working_directory.clone();

        let result = async {
            if absolute {
                channel
                    .send_command(&FtpCommand::Cwd("/".to_string()))
                    .await?
                    .require_success()?;
            }

            if let [single] = &segments[..] {
                channel
                    .send_command(&FtpCommand::Mkd(single.clone()))
                    .await?
                    .require_success()?;
                return Ok(());
            }

            for segment in &segments {
                let reply = channel
                    .send_command(&FtpCommand::Cwd(segment.clone()))
                    .await?;
                if reply.status == StatusCode::FileUnavailable {
                    channel
                        .send_command(&FtpCommand::Mkd(segment.clone()))
                        .await?
                        .require_success()?;
                    channel
                        .send_command(&FtpCommand::Cwd(segment.clone()))
                        .await?
                        .require_success()?;
                } else {
                    reply.require_success()?;
                }
            }
            Ok(())
        }
        .await;

        // the walk moved the working directory; put it back
        if absolute || segments.len() > 1 {
            let restore = channel
                .send_command(&FtpCommand::Cwd(original.clone()))
                .await
                .and_then(|reply| reply.require_success());
            if let Err(e) = restore {
                warn!("failed to restore working directory {original}: {e}");
            }
        }
        result
    }

    /// Delete a directory, recursing into it when it is not empty
    ///
    /// A 550 on RMD means contents remain: every file inside is deleted
    /// (DELE), subdirectories recurse, and the RMD is retried. Deleting
    /// `/` is a no-op.
    pub async fn delete_directory(&mut self, path: &str) -> Result<()> {
        if path == "/" {
            return Ok(());
        }
        self.delete_directory_recursive(path.to_string()).await
    }

    fn delete_directory_recursive(
        &mut self,
        path: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let channel = self.authenticated_channel()?;

            let reply = channel
                .send_command(&FtpCommand::Rmd(path.clone()))
                .await?;
            match reply.status {
                StatusCode::CommandOk | StatusCode::FileActionOk => return Ok(()),
                // not empty: clear it out and retry
                StatusCode::FileUnavailable => {}
                _ => {
                    return Err(FtpError::Protocol {
                        code: reply.code(),
                        message: reply.message,
                    });
                }
            }

            debug!("directory {path} not empty, deleting contents");
            channel
                .send_command(&FtpCommand::Cwd(path.clone()))
                .await?
                .require_success()?;

            let nodes = self.list_all().await?;
            for node in nodes.iter().filter(|n| n.kind != NodeKind::Directory) {
                channel
                    .send_command(&FtpCommand::Dele(node.name.clone()))
                    .await?
                    .require_success()?;
            }
            for node in nodes.iter().filter(|n| n.kind == NodeKind::Directory) {
                self.delete_directory_recursive(node.name.clone()).await?;
            }

            channel
                .send_command(&FtpCommand::Cwd("..".to_string()))
                .await?
                .require_success()?;
            channel
                .send_command(&FtpCommand::Rmd(path))
                .await?
                .require(&[StatusCode::CommandOk, StatusCode::FileActionOk])?;
            Ok(())
        })
    }

    /// Rename a file or directory (RNFR/RNTO)
    pub async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let channel = self.authenticated_channel()?;
        channel
            .send_command(&FtpCommand::Rnfr(from.to_string()))
            .await?
            .require(&[StatusCode::FileActionPending])?;
        channel
            .send_command(&FtpCommand::Rnto(to.to_string()))
            .await?
            .require(&[StatusCode::FileActionOk, StatusCode::ClosingData])?;
        Ok(())
    }

    /// Delete a file (DELE)
    pub async fn delete_file(&mut self, name: &str) -> Result<()> {
        let channel = self.authenticated_channel()?;
        channel
            .send_command(&FtpCommand::Dele(name.to_string()))
            .await?
            .require_success()?;
        Ok(())
    }
}
