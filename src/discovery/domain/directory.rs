//! Directory listings and their translation into endpoint candidates.

use super::{EndpointCandidate, ProtocolVersionTarget};
use crate::catalog::domain::{InforesId, Maturity, ProviderTitle, ProviderUrl};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Role tag identifying knowledge providers in the directory.
const PROVIDER_COMPONENT: &str = "KP";

/// Suffix of the capability-manifest path declared by directory entries.
const MANIFEST_SUFFIX: &str = "/meta_knowledge_graph";

/// Which of the two directory searches to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryQuery {
    /// Entries tagged as protocol knowledge providers.
    Primary,
    /// Any protocol entry; used when the primary search fails.
    Fallback,
}

impl DirectoryQuery {
    /// Returns the free-text search terms sent to the directory.
    #[must_use]
    pub const fn search_terms(self) -> &'static str {
        match self {
            Self::Primary => "TRAPI KP",
            Self::Fallback => "TRAPI",
        }
    }
}

impl fmt::Display for DirectoryQuery {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => formatter.write_str("primary"),
            Self::Fallback => formatter.write_str("fallback"),
        }
    }
}

/// Decoded directory response.
///
/// Entries are kept as raw JSON so that one malformed entry cannot fail the
/// whole listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// Directory entries in response order.
    pub hits: Vec<Value>,
}

/// Why a directory entry, or one of its servers, was not turned into a
/// candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry has no `info.title`.
    MissingTitle,
    /// The entry title is not a valid provider title.
    InvalidTitle(String),
    /// The entry has no `info.x-translator.component`.
    MissingComponent,
    /// The entry's component is not a knowledge provider.
    NotAKnowledgeProvider(String),
    /// The entry has no `info.x-trapi.version`.
    MissingProtocolVersion,
    /// The entry's protocol version is outside the accepted line.
    ProtocolVersionMismatch {
        /// Declared version.
        found: String,
        /// Accepted protocol line.
        expected: ProtocolVersionTarget,
    },
    /// No declared path ends in `/meta_knowledge_graph`.
    MissingManifestPath,
    /// The entry has no `servers` list.
    MissingServers,
    /// A server has no `url`.
    MissingServerUrl,
    /// A server URL does not resolve to an HTTP(S) endpoint.
    InvalidServerUrl(String),
    /// A server declares an unrecognized `x-maturity`.
    UnknownMaturity(String),
    /// No usable business identity could be determined.
    InvalidInfores,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTitle => formatter.write_str("no title"),
            Self::InvalidTitle(title) => write!(formatter, "invalid title '{title}'"),
            Self::MissingComponent => formatter.write_str("no x-translator.component"),
            Self::NotAKnowledgeProvider(component) => {
                write!(formatter, "component is '{component}', not KP")
            }
            Self::MissingProtocolVersion => formatter.write_str("no x-trapi.version"),
            Self::ProtocolVersionMismatch { found, expected } => {
                write!(formatter, "protocol version {found} is not {expected}.x")
            }
            Self::MissingManifestPath => formatter.write_str("no /meta_knowledge_graph path"),
            Self::MissingServers => formatter.write_str("no servers"),
            Self::MissingServerUrl => formatter.write_str("server has no url"),
            Self::InvalidServerUrl(url) => write!(formatter, "invalid server url '{url}'"),
            Self::UnknownMaturity(tier) => write!(formatter, "unknown x-maturity '{tier}'"),
            Self::InvalidInfores => formatter.write_str("no usable infores identifier"),
        }
    }
}

/// A directory entry or server that was passed over, with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSkipped {
    /// Entry title, when one was present.
    pub title: Option<String>,
    /// Directory identifier, when one was present.
    pub external_id: Option<String>,
    /// Why the entry was skipped.
    pub reason: SkipReason,
}

/// Result of translating a directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Accepted candidates in listing order.
    pub candidates: Vec<EndpointCandidate>,
    /// Entries and servers that were passed over.
    pub skipped: Vec<CandidateSkipped>,
    /// Entries accepted without a declared infores identifier.
    pub missing_infores: Vec<String>,
}

/// Translates a directory listing into endpoint candidates.
///
/// Each entry is processed independently; a defect in one entry, or in one
/// of its servers, only skips that entry or server.
#[must_use]
pub fn parse_listing(listing: &DirectoryListing, target: &ProtocolVersionTarget) -> Discovery {
    let mut discovery = Discovery::default();
    for hit in &listing.hits {
        parse_hit(hit, target, &mut discovery);
    }
    discovery
}

fn text<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a str> {
    value.and_then(|inner| inner.get(key)).and_then(Value::as_str)
}

fn parse_hit(hit: &Value, target: &ProtocolVersionTarget, discovery: &mut Discovery) {
    let entry = match accept_entry(hit, target) {
        Ok(entry) => entry,
        Err(skipped) => {
            discovery.skipped.push(skipped);
            return;
        }
    };

    let infores_id = match entry.declared_infores.clone() {
        Some(declared) => declared,
        None => match InforesId::derived_from(entry.external_id) {
            Ok(derived) => {
                discovery.missing_infores.push(entry.title.to_string());
                derived
            }
            Err(_) => {
                discovery.skipped.push(entry.skip(SkipReason::InvalidInfores));
                return;
            }
        },
    };

    let disambiguate = entry.servers.len() > 1;
    for server in entry.servers {
        match server_candidate(&entry, &infores_id, server, disambiguate) {
            Ok(candidate) => discovery.candidates.push(candidate),
            Err(skipped) => discovery.skipped.push(skipped),
        }
    }
}

/// A directory entry that passed the entry-level checks.
struct AcceptedEntry<'a> {
    raw_title: &'a str,
    external_id: &'a str,
    title: ProviderTitle,
    declared_infores: Option<InforesId>,
    version: &'a str,
    declared_operations: Option<Vec<String>>,
    prefix: &'a str,
    servers: &'a [Value],
}

impl AcceptedEntry<'_> {
    fn skip(&self, reason: SkipReason) -> CandidateSkipped {
        skipped(self.raw_title, self.external_id, reason)
    }
}

fn skipped(title: &str, external_id: &str, reason: SkipReason) -> CandidateSkipped {
    CandidateSkipped {
        title: Some(title.to_owned()),
        external_id: Some(external_id.to_owned()),
        reason,
    }
}

fn accept_entry<'a>(
    hit: &'a Value,
    target: &ProtocolVersionTarget,
) -> Result<AcceptedEntry<'a>, CandidateSkipped> {
    let declared_id = hit.get("_id").and_then(Value::as_str);
    let info = hit.get("info");
    let raw_title = text(info, "title").ok_or_else(|| CandidateSkipped {
        title: None,
        external_id: declared_id.map(str::to_owned),
        reason: SkipReason::MissingTitle,
    })?;
    let external_id = declared_id.unwrap_or(raw_title);
    let skip = |reason| skipped(raw_title, external_id, reason);

    let title = ProviderTitle::new(raw_title)
        .map_err(|_| skip(SkipReason::InvalidTitle(raw_title.to_owned())))?;

    let translator = info.and_then(|inner| inner.get("x-translator"));
    let declared_infores = text(translator, "infores").and_then(|id| InforesId::new(id).ok());
    let component =
        text(translator, "component").ok_or_else(|| skip(SkipReason::MissingComponent))?;
    if component != PROVIDER_COMPONENT {
        return Err(skip(SkipReason::NotAKnowledgeProvider(component.to_owned())));
    }

    let trapi = info.and_then(|inner| inner.get("x-trapi"));
    let version = text(trapi, "version").ok_or_else(|| skip(SkipReason::MissingProtocolVersion))?;
    if !target.accepts(version) {
        return Err(skip(SkipReason::ProtocolVersionMismatch {
            found: version.to_owned(),
            expected: *target,
        }));
    }
    let declared_operations = trapi
        .and_then(|inner| inner.get("operations"))
        .and_then(Value::as_array)
        .map(|operations| {
            operations
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect::<Vec<_>>()
        });

    let prefix = hit
        .get("paths")
        .and_then(Value::as_object)
        .and_then(|paths| paths.keys().find_map(|path| path.strip_suffix(MANIFEST_SUFFIX)))
        .ok_or_else(|| skip(SkipReason::MissingManifestPath))?;

    let servers = hit
        .get("servers")
        .and_then(Value::as_array)
        .ok_or_else(|| skip(SkipReason::MissingServers))?;

    Ok(AcceptedEntry {
        raw_title,
        external_id,
        title,
        declared_infores,
        version,
        declared_operations,
        prefix,
        servers,
    })
}

fn server_maturity(server: &Value) -> Result<Maturity, SkipReason> {
    match server.get("x-maturity") {
        None | Some(Value::Null) => Ok(Maturity::default()),
        Some(Value::String(tier)) => Maturity::try_from(tier.as_str())
            .map_err(|_| SkipReason::UnknownMaturity(tier.clone())),
        Some(other) => Err(SkipReason::UnknownMaturity(other.to_string())),
    }
}

fn server_candidate(
    entry: &AcceptedEntry<'_>,
    infores_id: &InforesId,
    server: &Value,
    disambiguate: bool,
) -> Result<EndpointCandidate, CandidateSkipped> {
    let url = server
        .get("url")
        .and_then(Value::as_str)
        .ok_or_else(|| entry.skip(SkipReason::MissingServerUrl))?;
    let maturity = server_maturity(server).map_err(|reason| entry.skip(reason))?;

    let resolved = format!("{}{}", url.trim_end_matches('/'), entry.prefix);
    let base_url = ProviderUrl::new(resolved.as_str())
        .map_err(|_| entry.skip(SkipReason::InvalidServerUrl(resolved.clone())))?;

    let title = if disambiguate {
        let suffixed = format!("{}_{maturity}", entry.title);
        ProviderTitle::new(suffixed.as_str())
            .map_err(|_| entry.skip(SkipReason::InvalidTitle(suffixed.clone())))?
    } else {
        entry.title.clone()
    };

    Ok(EndpointCandidate {
        external_id: entry.external_id.to_owned(),
        title,
        infores_id: infores_id.clone(),
        base_url,
        maturity,
        protocol_version: entry.version.to_owned(),
        declared_operations: entry.declared_operations.clone(),
    })
}
