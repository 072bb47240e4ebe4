//! Directory listings over the data channel
//!
//! The strategy is fixed at login: MLSD when the server advertises it,
//! LIST otherwise. LIST output is probed against the Unix parser first,
//! then DOS; an unrecognized format yields no records.

use crate::commands::FtpCommand;
use crate::error::{FtpError, Result};
use crate::list::{self, NodeInformation, NodeKind};
use crate::response::StatusCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::FtpClient;
use super::channel::MaybeTlsStream;
use super::state::ListingStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    All,
    Files,
    Directories,
}

impl FtpClient {
    /// List every entry of the working directory
    pub async fn list_all(&mut self) -> Result<Vec<NodeInformation>> {
        self.run_listing(Filter::All).await
    }

    /// List the files of the working directory
    pub async fn list_files(&mut self) -> Result<Vec<NodeInformation>> {
        self.run_listing(Filter::Files).await
    }

    /// List the subdirectories of the working directory
    pub async fn list_directories(&mut self) -> Result<Vec<NodeInformation>> {
        self.run_listing(Filter::Directories).await
    }

    async fn run_listing(&mut self, filter: Filter) -> Result<Vec<NodeInformation>> {
        let channel = self.authenticated_channel()?;
        let strategy = self.state.listing;

        let (command, accepted): (FtpCommand, &[StatusCode]) = match strategy {
            ListingStrategy::Mlsd => (
                FtpCommand::Mlsd,
                &[
                    StatusCode::DataAlreadyOpen,
                    StatusCode::OpeningData,
                    StatusCode::ClosingData,
                ],
            ),
            ListingStrategy::List => (
                FtpCommand::List,
                &[StatusCode::DataAlreadyOpen, StatusCode::OpeningData],
            ),
        };

        let (stream, reply, _permit) = self.open_data_channel(command, accepted).await?;
        let lines = read_listing_lines(stream, self.config.timeout()).await?;

        // completion lands on the control channel once the data connection
        // is drained; 226 at command time means it already arrived
        if reply.status != StatusCode::ClosingData {
            channel.read_reply().await?.require_success()?;
        }

        let nodes = match strategy {
            ListingStrategy::Mlsd => mlsd_nodes(&lines, filter),
            ListingStrategy::List => list_nodes(&lines, filter),
        };
        debug!("listing returned {} nodes", nodes.len());
        Ok(nodes)
    }
}

/// Drain the data stream to EOF, then shut it down
async fn read_listing_lines(stream: MaybeTlsStream, per_read: Duration) -> Result<Vec<String>> {
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    loop {
        let mut raw = Vec::with_capacity(256);
        let n = timeout(per_read, reader.read_until(b'\n', &mut raw))
            .await
            .map_err(|_| FtpError::Timeout)??;
        if n == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&raw);
        lines.push(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let mut stream = reader.into_inner();
    if let Err(e) = stream.shutdown().await {
        warn!("error closing listing stream: {e}");
    }
    Ok(lines)
}

fn mlsd_nodes(lines: &[String], filter: Filter) -> Vec<NodeInformation> {
    lines
        .iter()
        .filter(|line| !line.is_empty())
        .filter(|line| match filter {
            Filter::All => true,
            Filter::Files => line.to_ascii_lowercase().contains("type=file"),
            Filter::Directories => line.to_ascii_lowercase().contains("type=dir"),
        })
        .filter_map(|line| list::parse_mlsd_line(line))
        .collect()
}

fn list_nodes(lines: &[String], filter: Filter) -> Vec<NodeInformation> {
    let sample = lines.iter().find(|line| !line.trim().is_empty());
    let parse: fn(&str) -> Option<NodeInformation> = match sample {
        Some(line) if list::unix::matches(line) => list::unix::parse,
        Some(line) if list::dos::matches(line) => list::dos::parse,
        _ => return Vec::new(),
    };

    lines
        .iter()
        .filter_map(|line| parse(line))
        .filter(|node| node.name != "." && node.name != "..")
        .filter(|node| match filter {
            Filter::All => true,
            Filter::Files => node.kind == NodeKind::File,
            Filter::Directories => node.kind == NodeKind::Directory,
        })
        .collect()
}
