// src/readiness/condition.rs

//! Parser for one-line readiness specs such as
//! `host=localhost port=8983 state=ready` or `File=/tmp/app.pid state=present`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::errors::ConditionError;

/// Which kind of external state a condition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Tcp,
    File,
}

impl TargetKind {
    fn label(self) -> &'static str {
        match self {
            TargetKind::Tcp => "host/port",
            TargetKind::File => "File",
        }
    }

    /// The only `state` value a target of this kind accepts.
    fn accepted_state(self) -> ReadinessState {
        match self {
            TargetKind::Tcp => ReadinessState::Ready,
            TargetKind::File => ReadinessState::Present,
        }
    }
}

/// What the condition waits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessTarget {
    /// A TCP endpoint that must accept connections.
    Tcp { host: String, port: u16 },
    /// A path that must exist.
    File { path: PathBuf },
}

impl ReadinessTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            ReadinessTarget::Tcp { .. } => TargetKind::Tcp,
            ReadinessTarget::File { .. } => TargetKind::File,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Ready,
    Present,
}

impl ReadinessState {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadinessState::Ready => "ready",
            ReadinessState::Present => "present",
        }
    }
}

impl FromStr for ReadinessState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(ReadinessState::Ready),
            "present" => Ok(ReadinessState::Present),
            _ => Err(()),
        }
    }
}

/// A validated readiness condition. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessCondition {
    target: ReadinessTarget,
    state: ReadinessState,
}

/// One row of the key table.
struct KeyRule {
    key: &'static str,
    /// Target kind selected by the presence of this key; `None` for keys
    /// shared by every kind.
    selects: Option<TargetKind>,
    required_for: &'static [TargetKind],
}

static KEY_TABLE: [KeyRule; 4] = [
    KeyRule {
        key: "host",
        selects: Some(TargetKind::Tcp),
        required_for: &[TargetKind::Tcp],
    },
    KeyRule {
        key: "port",
        selects: Some(TargetKind::Tcp),
        required_for: &[TargetKind::Tcp],
    },
    KeyRule {
        key: "File",
        selects: Some(TargetKind::File),
        required_for: &[TargetKind::File],
    },
    KeyRule {
        key: "state",
        selects: None,
        required_for: &[TargetKind::Tcp, TargetKind::File],
    },
];

impl ReadinessCondition {
    /// Parse a whitespace-separated list of `key=value` tokens.
    ///
    /// Keys are case-sensitive. Unknown keys and tokens without `=` are
    /// ignored so newer specs still parse here.
    pub fn parse(spec: &str) -> Result<Self, ConditionError> {
        let values = collect_known_keys(spec)?;

        let mut kinds = KEY_TABLE
            .iter()
            .filter(|rule| values.contains_key(rule.key))
            .filter_map(|rule| rule.selects);
        let kind = match kinds.next() {
            None => return Err(ConditionError::MissingTarget),
            Some(first) => {
                if kinds.any(|k| k != first) {
                    return Err(ConditionError::ConflictingTargets);
                }
                first
            }
        };

        for rule in KEY_TABLE.iter() {
            if rule.required_for.contains(&kind) && !values.contains_key(rule.key) {
                return Err(ConditionError::MissingKey(rule.key));
            }
        }

        let target = match kind {
            TargetKind::Tcp => {
                let host = non_empty(values["host"], "host")?;
                let port = parse_port(values["port"])?;
                ReadinessTarget::Tcp {
                    host: host.to_string(),
                    port,
                }
            }
            TargetKind::File => ReadinessTarget::File {
                path: PathBuf::from(non_empty(values["File"], "File")?),
            },
        };

        let raw_state = values["state"];
        let state = raw_state
            .parse::<ReadinessState>()
            .ok()
            .filter(|s| *s == kind.accepted_state())
            .ok_or_else(|| ConditionError::InvalidState {
                target: kind.label(),
                state: raw_state.to_string(),
            })?;

        Ok(Self { target, state })
    }

    pub fn target(&self) -> &ReadinessTarget {
        &self.target
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn host(&self) -> Option<&str> {
        match &self.target {
            ReadinessTarget::Tcp { host, .. } => Some(host),
            ReadinessTarget::File { .. } => None,
        }
    }

    pub fn port(&self) -> Option<u16> {
        match &self.target {
            ReadinessTarget::Tcp { port, .. } => Some(*port),
            ReadinessTarget::File { .. } => None,
        }
    }

    pub fn file(&self) -> Option<&Path> {
        match &self.target {
            ReadinessTarget::File { path } => Some(path),
            ReadinessTarget::Tcp { .. } => None,
        }
    }
}

impl FromStr for ReadinessCondition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReadinessCondition::parse(s)
    }
}

impl fmt::Display for ReadinessCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            ReadinessTarget::Tcp { host, port } => {
                write!(f, "host={host} port={port}")?;
            }
            ReadinessTarget::File { path } => {
                write!(f, "File={}", path.display())?;
            }
        }
        write!(f, " state={}", self.state.as_str())
    }
}

fn collect_known_keys(spec: &str) -> Result<HashMap<&'static str, &str>, ConditionError> {
    let mut values = HashMap::new();

    for token in spec.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            debug!(token, "ignoring readiness token without '='");
            continue;
        };

        match KEY_TABLE.iter().find(|rule| rule.key == key) {
            Some(rule) => {
                if values.insert(rule.key, value).is_some() {
                    return Err(ConditionError::DuplicateKey(key.to_string()));
                }
            }
            None => debug!(key, "ignoring unknown readiness key"),
        }
    }

    Ok(values)
}

fn non_empty<'a>(value: &'a str, key: &'static str) -> Result<&'a str, ConditionError> {
    if value.is_empty() {
        Err(ConditionError::MissingKey(key))
    } else {
        Ok(value)
    }
}

fn parse_port(value: &str) -> Result<u16, ConditionError> {
    if !value.bytes().all(|b| b.is_ascii_digit()) || value.is_empty() {
        return Err(ConditionError::InvalidPort(value.to_string()));
    }
    value
        .parse::<u16>()
        .map_err(|_| ConditionError::InvalidPort(value.to_string()))
}
