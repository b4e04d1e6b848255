//! Snapshot restore orchestration.
//!
//! Drives the whole pipeline: locate the snapshot, demultiplex its entries,
//! parse each table file, reconstruct peers at site-identity boundaries,
//! insert rows for online peers, and finally commit the complete peer set
//! into the registry in one atomic swap.
//!
//! Peer boundaries are implicit in entry order: the exporter emits one
//! `sites.json` immediately before each peer's data files, so arrival of a
//! site identity entry starts a new peer and every following data entry
//! belongs to it until the next one.

use crate::config::Config;
use crate::error::{Error, Result, SchemaError};
use crate::peer::{Connection, HealthMonitor, Peer, PeerRegistry, PeerState, PeerStatus};
use crate::restore::archive::{ArchiveEntry, ArchiveReader};
use crate::restore::table_file::{self, ParsedTableFile};
use crate::schema::{as_f64, as_i64, as_string, as_string_list, Schema, TABLE_SITES};
use serde_json::Value as Json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a completed restore call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Number of peers committed to the registry.
    pub peers_restored: usize,
}

/// Snapshot importer bound to a schema and the shared peer registry.
pub struct Importer {
    schema: Arc<Schema>,
    registry: Arc<PeerRegistry>,
    monitor: HealthMonitor,
}

impl Importer {
    /// Create an importer.
    pub fn new(config: &Config, schema: Arc<Schema>, registry: Arc<PeerRegistry>) -> Self {
        let monitor = HealthMonitor::new(config, Arc::clone(&registry));
        Self {
            schema,
            registry,
            monitor,
        }
    }

    /// The registry this importer commits into.
    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    /// The health monitor restarted after a successful restore.
    pub fn monitor(&self) -> &HealthMonitor {
        &self.monitor
    }

    /// Restore all peers from a snapshot path.
    ///
    /// Refuses with a logged warning (not an error) when the registry
    /// already holds peers: restore is a cold-start operation only. On any
    /// fatal error the in-progress peer list is discarded and the registry
    /// is left untouched; the complete peer set is committed only after
    /// every peer reconstructed and finalized successfully.
    pub fn restore_from_snapshot(&self, path: impl AsRef<Path>) -> Result<RestoreSummary> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|source| Error::Access {
            path: path.to_path_buf(),
            source,
        })?;

        if !self.registry.is_empty() {
            warn!(
                path = %path.display(),
                peers = self.registry.len(),
                "restore from snapshot is not possible, peers already loaded"
            );
            return Ok(RestoreSummary { peers_restored: 0 });
        }

        let peers = if meta.is_dir() {
            self.restore_from_dir(path)?
        } else if meta.is_file() {
            self.restore_from_archive(path)?
        } else {
            return Err(Error::Unsupported(format!(
                "{} is neither a directory nor a regular file",
                path.display()
            )));
        };

        for peer in &peers {
            peer.data().set_references(&self.schema, peer.name())?;
        }

        let peers_restored = peers.len();
        self.registry.replace(peers);
        self.monitor.restart();

        info!(peers = peers_restored, path = %path.display(), "snapshot restore complete");
        Ok(RestoreSummary { peers_restored })
    }

    /// Directory-based snapshot import.
    ///
    /// Not implemented: fails explicitly so callers cannot mistake it for
    /// an empty snapshot.
    fn restore_from_dir(&self, path: &Path) -> Result<Vec<Arc<Peer>>> {
        Err(Error::Unsupported(format!(
            "directory snapshots are not supported: {}",
            path.display()
        )))
    }

    fn restore_from_archive(&self, path: &Path) -> Result<Vec<Arc<Peer>>> {
        let mut reader = ArchiveReader::open(path)?;
        let mut entries = reader.entries()?;
        let mut peers: Vec<Arc<Peer>> = Vec::new();

        while let Some(entry) = entries.next_file()? {
            self.restore_entry(&mut peers, entry)?;
        }

        Ok(peers)
    }

    /// Process one archive entry against the in-progress peer list.
    fn restore_entry(&self, peers: &mut Vec<Arc<Peer>>, mut entry: ArchiveEntry<'_>) -> Result<()> {
        let name = entry.name().to_string();
        let size = entry.size();
        debug!(entry = %name, size, "reading snapshot entry");

        let parsed = table_file::parse_entry(&self.schema, &name, &mut entry, size)?;

        if parsed.table.name == TABLE_SITES {
            let peer = Self::reconstruct_peer(&name, &parsed)?;
            info!(peer = %peer.name(), id = %peer.id(), entry = %name, "restoring peer");
            peers.push(Arc::new(peer));
        }

        // Virtual tables are parsed for validation only.
        if parsed.table.is_virtual() {
            return Ok(());
        }

        let Some(peer) = peers.last() else {
            return Err(Error::DataBeforeIdentity { entry: name });
        };

        // Peers not online at export time get no restored rows.
        if peer.is_online() {
            peer.data()
                .insert_rows(&parsed.table, &parsed.rows, &parsed.columns, peer.name())?;
        }

        Ok(())
    }

    /// Build a new peer from its single site identity row.
    fn reconstruct_peer(entry_name: &str, parsed: &ParsedTableFile) -> Result<Peer> {
        if parsed.rows.len() != 1 {
            return Err(Error::SiteRowCount {
                entry: entry_name.to_string(),
                count: parsed.rows.len(),
            });
        }
        let row = &parsed.rows[0];

        let cell = |column: &str| -> Result<&Json> {
            let idx = parsed
                .columns
                .iter()
                .position(|c| c.name == column)
                .ok_or_else(|| SchemaError::MissingColumn {
                    table: TABLE_SITES.to_string(),
                    column: column.to_string(),
                })?;
            row.get(idx).ok_or_else(|| Error::Corrupt {
                context: entry_name.to_string(),
                reason: format!("site row carries no value for column {column}"),
            })
        };

        let connection = Connection {
            name: as_string(cell("peer_name")?),
            id: as_string(cell("peer_key")?),
            source: vec![as_string(cell("addr")?)],
            section: as_string(cell("section")?),
            flags: as_string_list(cell("flags")?),
        };

        let peer = Peer::new(connection);
        peer.set_status(PeerStatus {
            state: PeerState::from_code(as_i64(cell("status")?)),
            last_update: as_i64(cell("last_update")?),
            last_error: as_string(cell("last_error")?),
            last_online: as_i64(cell("last_online")?),
            queries: as_i64(cell("queries")?),
            response_time: as_f64(cell("response_time")?),
        });

        Ok(peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use serde_json::json;
    use std::fs::File;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    struct ArchiveFixture {
        _dir: TempDir,
        path: PathBuf,
    }

    fn build_archive(entries: &[(&str, Option<String>)]) -> ArchiveFixture {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.tar.gz");
        let file = File::create(&path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            match content {
                Some(body) => {
                    header.set_size(body.len() as u64);
                    header.set_mode(0o644);
                    header.set_cksum();
                    builder
                        .append_data(&mut header, name, body.as_bytes())
                        .unwrap();
                }
                None => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_size(0);
                    header.set_mode(0o755);
                    header.set_cksum();
                    builder.append_data(&mut header, name, &[][..]).unwrap();
                }
            }
        }
        builder.into_inner().unwrap().finish().unwrap();

        ArchiveFixture { _dir: dir, path }
    }

    fn sites_json(name: &str, key: &str, status: i64) -> String {
        json!([
            [
                "peer_name",
                "peer_key",
                "addr",
                "section",
                "flags",
                "status",
                "last_update",
                "last_error",
                "last_online",
                "queries",
                "response_time"
            ],
            [
                name,
                key,
                "127.0.0.1:6557",
                "default",
                ["tls"],
                status,
                1700000000_i64,
                "",
                1700000000_i64,
                42,
                0.025
            ]
        ])
        .to_string()
    }

    fn hosts_json(names: &[&str]) -> String {
        let mut rows = vec![json!(["name", "state"])];
        rows.extend(names.iter().map(|n| json!([n, 0])));
        json!(rows).to_string()
    }

    fn importer() -> Importer {
        Importer::new(
            &Config::default(),
            Arc::new(Schema::monitoring()),
            Arc::new(PeerRegistry::new()),
        )
    }

    #[test]
    fn test_restore_single_peer_with_hosts() {
        let fixture = build_archive(&[
            ("peer1/", None),
            ("peer1/sites.json", Some(sites_json("A", "k1", 1))),
            ("peer1/hosts.json", Some(hosts_json(&["web1", "web2"]))),
        ]);

        let importer = importer();
        let summary = importer.restore_from_snapshot(&fixture.path).unwrap();
        assert_eq!(summary.peers_restored, 1);

        let registry = importer.registry();
        assert_eq!(registry.ids_in_order(), vec!["k1"]);

        let peer = registry.get("k1").unwrap();
        assert_eq!(peer.name(), "A");
        assert!(peer.is_online());
        assert_eq!(peer.connection().source, vec!["127.0.0.1:6557"]);
        assert_eq!(peer.connection().flags, vec!["tls"]);

        let status = peer.status();
        assert_eq!(status.last_update, 1700000000);
        assert_eq!(status.queries, 42);
        assert_eq!(status.response_time, 0.025);

        // Rows restored in file order.
        assert_eq!(peer.data().row_count("hosts"), 2);
        peer.data()
            .with_store("hosts", |store| {
                let names = store.column_values("name").unwrap();
                assert_eq!(names[0].as_str(), Some("web1"));
                assert_eq!(names[1].as_str(), Some("web2"));
            })
            .unwrap();

        // The site identity row itself is stored too.
        assert_eq!(peer.data().row_count("sites"), 1);
    }

    #[test]
    fn test_offline_peer_gets_no_rows() {
        let fixture = build_archive(&[
            ("peer1/sites.json", Some(sites_json("A", "k1", 0))),
            ("peer1/hosts.json", Some(hosts_json(&["web1", "web2"]))),
        ]);

        let importer = importer();
        let summary = importer.restore_from_snapshot(&fixture.path).unwrap();
        assert_eq!(summary.peers_restored, 1);

        let peer = importer.registry().get("k1").unwrap();
        assert!(!peer.is_online());
        assert_eq!(peer.data().row_count("hosts"), 0);
        assert_eq!(peer.data().row_count("sites"), 0);
    }

    #[test]
    fn test_boundary_detection_two_peers() {
        let fixture = build_archive(&[
            ("peer1/sites.json", Some(sites_json("A", "k1", 1))),
            ("peer1/hosts.json", Some(hosts_json(&["a1", "a2"]))),
            ("peer2/sites.json", Some(sites_json("B", "k2", 1))),
            ("peer2/hosts.json", Some(hosts_json(&["b1"]))),
        ]);

        let importer = importer();
        let summary = importer.restore_from_snapshot(&fixture.path).unwrap();
        assert_eq!(summary.peers_restored, 2);

        let registry = importer.registry();
        assert_eq!(registry.ids_in_order(), vec!["k1", "k2"]);
        assert_eq!(registry.get("k1").unwrap().data().row_count("hosts"), 2);
        assert_eq!(registry.get("k2").unwrap().data().row_count("hosts"), 1);
    }

    #[test]
    fn test_virtual_table_parsed_but_not_stored() {
        let status_body = json!([["program_start", "requests"], [1700000000_i64, 9]]).to_string();
        let fixture = build_archive(&[
            ("peer1/sites.json", Some(sites_json("A", "k1", 1))),
            ("peer1/status.json", Some(status_body)),
        ]);

        let importer = importer();
        importer.restore_from_snapshot(&fixture.path).unwrap();

        let peer = importer.registry().get("k1").unwrap();
        assert!(!peer.data().has_table("status"));
    }

    #[test]
    fn test_corrupt_virtual_table_still_fails() {
        let fixture = build_archive(&[
            ("peer1/sites.json", Some(sites_json("A", "k1", 1))),
            ("peer1/status.json", Some("{broken".to_string())),
        ]);

        let importer = importer();
        let err = importer.restore_from_snapshot(&fixture.path).unwrap_err();
        assert!(matches!(err, Error::Corrupt { .. }));
        assert!(importer.registry().is_empty());
    }

    #[test]
    fn test_wrong_site_row_count() {
        let two_rows = json!([
            ["peer_name", "peer_key", "addr", "section", "flags", "status",
             "last_update", "last_error", "last_online", "queries", "response_time"],
            ["A", "k1", "x", "", [], 1, 0, "", 0, 0, 0.0],
            ["B", "k2", "y", "", [], 1, 0, "", 0, 0, 0.0]
        ])
        .to_string();
        let fixture = build_archive(&[("peer1/sites.json", Some(two_rows))]);

        let importer = importer();
        let err = importer.restore_from_snapshot(&fixture.path).unwrap_err();
        match err {
            Error::SiteRowCount { entry, count } => {
                assert_eq!(entry, "peer1/sites.json");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(importer.registry().is_empty());
    }

    #[test]
    fn test_unknown_column_leaves_registry_empty() {
        let bad_hosts = json!([["name", "bogus"], ["web1", 1]]).to_string();
        let fixture = build_archive(&[
            ("peer1/sites.json", Some(sites_json("A", "k1", 1))),
            ("peer1/hosts.json", Some(bad_hosts)),
        ]);

        let importer = importer();
        let err = importer.restore_from_snapshot(&fixture.path).unwrap_err();
        match err {
            Error::Schema(SchemaError::UnknownColumn { column, .. }) => {
                assert_eq!(column, "bogus");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(importer.registry().is_empty());
    }

    #[test]
    fn test_data_before_identity() {
        let fixture = build_archive(&[("peer1/hosts.json", Some(hosts_json(&["web1"])))]);

        let importer = importer();
        let err = importer.restore_from_snapshot(&fixture.path).unwrap_err();
        assert!(matches!(err, Error::DataBeforeIdentity { .. }));
        assert!(importer.registry().is_empty());
    }

    #[test]
    fn test_unrecognized_entry_is_fatal() {
        let fixture = build_archive(&[
            ("peer1/sites.json", Some(sites_json("A", "k1", 1))),
            ("peer1/notes.txt", Some("free text".to_string())),
        ]);

        let importer = importer();
        let err = importer.restore_from_snapshot(&fixture.path).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::UnrecognizedEntry(_))
        ));
        assert!(importer.registry().is_empty());
    }

    #[test]
    fn test_reference_resolution_failure_discards_all() {
        let services = json!([["host_name", "description"], ["web1", "ping"]]).to_string();
        let fixture = build_archive(&[
            ("peer1/sites.json", Some(sites_json("A", "k1", 1))),
            ("peer1/services.json", Some(services)),
        ]);

        let importer = importer();
        let err = importer.restore_from_snapshot(&fixture.path).unwrap_err();
        assert!(matches!(err, Error::ReferenceResolution { .. }));
        assert!(importer.registry().is_empty());
    }

    #[test]
    fn test_refusal_when_registry_populated() {
        let fixture = build_archive(&[
            ("peer1/sites.json", Some(sites_json("A", "k1", 1))),
            ("peer1/hosts.json", Some(hosts_json(&["web1"]))),
        ]);

        let importer = importer();
        importer.restore_from_snapshot(&fixture.path).unwrap();
        assert_eq!(importer.registry().len(), 1);

        // Second restore is refused, not an error, and changes nothing.
        let summary = importer.restore_from_snapshot(&fixture.path).unwrap();
        assert_eq!(summary.peers_restored, 0);
        assert_eq!(importer.registry().ids_in_order(), vec!["k1"]);
    }

    #[test]
    fn test_directory_mode_unsupported() {
        let dir = tempdir().unwrap();
        let importer = importer();
        let err = importer.restore_from_snapshot(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert!(importer.registry().is_empty());
    }

    #[test]
    fn test_missing_snapshot_is_access_error() {
        let importer = importer();
        let err = importer
            .restore_from_snapshot("/no/such/snapshot.tar.gz")
            .unwrap_err();
        assert!(matches!(err, Error::Access { .. }));
    }

    #[test]
    fn test_missing_required_site_column() {
        let body = json!([["peer_name"], ["A"]]).to_string();
        let fixture = build_archive(&[("peer1/sites.json", Some(body))]);

        let importer = importer();
        let err = importer.restore_from_snapshot(&fixture.path).unwrap_err();
        match err {
            Error::Schema(SchemaError::MissingColumn { column, .. }) => {
                assert_eq!(column, "peer_key");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(importer.registry().is_empty());
    }

    #[tokio::test]
    async fn test_restore_starts_health_monitor() {
        let fixture = build_archive(&[(
            "peer1/sites.json",
            Some(sites_json("A", "k1", 1)),
        )]);

        let importer = importer();
        importer.restore_from_snapshot(&fixture.path).unwrap();
        assert_eq!(importer.registry().len(), 1);
        importer.monitor().shutdown();
    }
}
