//! Peer access for coil
//!
//! This module provides everything the client does over the network:
//! - Peer list loading (peers file plus configured extras)
//! - A blocking HTTP transport behind the [`Transport`] trait
//! - First-responsive-peer selection for chain sync, balance queries and
//!   transaction submission
//!
//! A peer counts as responsive when it answers `200` with a JSON content
//! type. Anything else is logged and the next peer is tried, in list order.

use crate::blockchain::Chain;
use crate::config::NetworkConfig;
use crate::error::{ChainError, Result};
use crate::transaction::TransactionPayload;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const CHAIN_ENDPOINT: &str = "/resolve/chain";
pub const BALANCE_ENDPOINT: &str = "/balance/";
pub const TX_ENDPOINT: &str = "/tx";

/// A peer node, identified by its network location (`host[:port]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    netloc: String,
}

impl Peer {
    /// Parse a peer entry. Scheme and path are accepted but ignored; requests
    /// always go to `http://<host[:port]>`.
    pub fn parse(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        let with_scheme = if entry.contains("://") {
            entry.to_string()
        } else {
            format!("http://{}", entry)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| ChainError::Parse(format!("Invalid peer '{}': {}", entry, e)))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ChainError::Parse(format!("Peer '{}' has no host", entry)));
        }

        // The authority exactly as written, so `host:443` keeps its port.
        let netloc = with_scheme
            .split_once("://")
            .map(|(_, rest)| rest)
            .and_then(|rest| rest.split(['/', '?', '#']).next())
            .unwrap_or_default()
            .to_string();
        Ok(Peer { netloc })
    }

    pub fn netloc(&self) -> &str {
        &self.netloc
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.netloc, path)
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.netloc)
    }
}

/// Parse a peers file body: one entry per line, blank lines and `#` comments
/// skipped. Unparseable entries are logged and dropped.
pub fn parse_peer_list(contents: &str) -> Vec<Peer> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match Peer::parse(line) {
            Ok(peer) => Some(peer),
            Err(e) => {
                warn!("Skipping peer entry: {}", e);
                None
            }
        })
        .collect()
}

/// Peers from `config.peers_path` followed by `config.peers`.
pub fn load_peers(config: &NetworkConfig) -> Result<Vec<Peer>> {
    let mut peers = match fs::read_to_string(&config.peers_path) {
        Ok(contents) => parse_peer_list(&contents),
        Err(e) if e.kind() == ErrorKind::NotFound && !config.peers.is_empty() => {
            debug!(path = %config.peers_path.display(), "no peers file, using configured peers");
            Vec::new()
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ChainError::NotFound(format!(
                "peers file {}",
                config.peers_path.display()
            )))
        }
        Err(e) => {
            return Err(ChainError::Io(format!(
                "Failed to read {}: {}",
                config.peers_path.display(),
                e
            )))
        }
    };

    for entry in &config.peers {
        match Peer::parse(entry) {
            Ok(peer) if !peers.contains(&peer) => peers.push(peer),
            Ok(_) => {}
            Err(e) => warn!("Skipping configured peer: {}", e),
        }
    }

    Ok(peers)
}

/// What a peer answered.
#[derive(Debug, Clone)]
pub struct PeerResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl PeerResponse {
    pub fn is_json_ok(&self) -> bool {
        self.status == 200
            && self
                .content_type
                .as_deref()
                .map(|ct| ct.trim_start().starts_with("application/json"))
                .unwrap_or(false)
    }
}

/// One HTTP round trip.
pub trait Transport {
    fn get(&self, url: &str) -> Result<PeerResponse>;
    fn post_json(&self, url: &str, body: &Value) -> Result<PeerResponse>;
}

/// Blocking `reqwest` transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    fn read(response: reqwest::blocking::Response) -> Result<PeerResponse> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text()?;
        Ok(PeerResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<PeerResponse> {
        Self::read(self.client.get(url).send()?)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<PeerResponse> {
        Self::read(self.client.post(url).json(body).send()?)
    }
}

/// Runs each request against the first responsive peer.
pub struct PeerClient<T = HttpTransport> {
    peers: Vec<Peer>,
    transport: T,
}

impl PeerClient<HttpTransport> {
    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        let peers = load_peers(config)?;
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(peers, transport))
    }
}

impl<T: Transport> PeerClient<T> {
    pub fn new(peers: Vec<Peer>, transport: T) -> Self {
        Self { peers, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Download the chain document served at `/resolve/chain`.
    pub fn fetch_chain(&self) -> Result<Chain> {
        let (peer, value) = self.first_response(|peer| self.transport.get(&peer.url(CHAIN_ENDPOINT)))?;
        let chain = Chain::from_value(value)?;
        debug!(peer = %peer, blocks = chain.len(), "fetched chain");
        Ok(chain)
    }

    /// Balance as reported by the peer, passed through untouched.
    pub fn fetch_balance(&self, address: &str) -> Result<Value> {
        let path = format!("{}{}", BALANCE_ENDPOINT, address);
        let (_, value) = self.first_response(|peer| self.transport.get(&peer.url(&path)))?;
        Ok(value)
    }

    /// POST the payload to `/tx` and return the peer's answer.
    pub fn submit_transaction(&self, payload: &TransactionPayload) -> Result<Value> {
        let body = serde_json::to_value(payload)?;
        let (_, value) =
            self.first_response(|peer| self.transport.post_json(&peer.url(TX_ENDPOINT), &body))?;
        Ok(value)
    }

    fn first_response<F>(&self, mut call: F) -> Result<(Peer, Value)>
    where
        F: FnMut(&Peer) -> Result<PeerResponse>,
    {
        for peer in &self.peers {
            match call(peer) {
                Ok(response) if response.is_json_ok() => {
                    match serde_json::from_str::<Value>(&response.body) {
                        Ok(value) => {
                            info!("Successfully connected to {}", peer);
                            return Ok((peer.clone(), value));
                        }
                        Err(e) => warn!("Peer {} sent invalid JSON: {}", peer, e),
                    }
                }
                Ok(response) => warn!(
                    "Peer {} answered {} ({})",
                    peer,
                    response.status,
                    response.content_type.as_deref().unwrap_or("no content type")
                ),
                Err(e) => warn!("Peer {} unreachable: {}", peer, e),
            }
        }
        Err(ChainError::NoPeerAvailable)
    }
}
