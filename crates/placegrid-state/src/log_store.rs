//! Line-delimited placement log.
//!
//! Layout: one record per line, columns `node_id;app_name;resource_type;image`,
//! no header. The file is only ever opened in append mode for writing, and a
//! missing file reads as an empty log.
//!
//! Every append starts on a fresh line: an unterminated tail is closed with a
//! newline first, and a write that fails midway is truncated back off.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use placegrid_core::{PlacementRecord, RECORD_DELIMITER, ResourceType};
use tracing::{debug, warn};

use crate::error::{StateError, StateResult};
use crate::store::{RecordIter, StateStore};

const FIELD_COUNT: usize = 4;

/// Append-only `;`-delimited file store.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    /// Use the log at `path`, creating its parent directory if needed.
    ///
    /// The file itself is created on the first append.
    pub fn open(path: &Path) -> StateResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        debug!(?path, "placement log opened");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StateError {
        StateError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStore for LogStore {
    fn append(&mut self, record: &PlacementRecord) -> StateResult<()> {
        let line = encode_line(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let len = file.metadata().map_err(|e| self.io_error(e))?.len();

        let mut buf = String::with_capacity(line.len() + 1);
        if len > 0 && !ends_with_newline(&mut file).map_err(|e| self.io_error(e))? {
            warn!(path = ?self.path, "placement log has an unterminated last line");
            buf.push('\n');
        }
        buf.push_str(&line);

        if let Err(e) = file.write_all(buf.as_bytes()).and_then(|()| file.sync_data()) {
            if let Err(truncate) = file.set_len(len) {
                warn!(path = ?self.path, error = %truncate, "failed to roll back partial append");
            }
            return Err(self.io_error(e));
        }
        debug!(node = %record.node_id, app = %record.app_name, "placement appended");
        Ok(())
    }

    fn load_all(&self) -> StateResult<RecordIter<'_>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "no placement log yet, starting empty");
                return Ok(Box::new(std::iter::empty()));
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let path = self.path.clone();
        let records = BufReader::new(file)
            .lines()
            .enumerate()
            .filter_map(move |(idx, line)| match line {
                Err(source) => Some(Err(StateError::Io {
                    path: path.clone(),
                    source,
                })),
                Ok(text) if text.trim().is_empty() => None,
                Ok(text) => Some(decode_line(&text).map_err(|reason| StateError::Corrupt {
                    line: idx + 1,
                    reason,
                })),
            });
        Ok(Box::new(records))
    }
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Render a record as one log line, including the trailing newline.
pub fn encode_line(record: &PlacementRecord) -> StateResult<String> {
    let fields = [
        record.node_id.as_str(),
        record.app_name.as_str(),
        record.resource_type.as_str(),
        record.image.as_str(),
    ];
    if let Some(bad) = fields
        .iter()
        .find(|f| f.contains([RECORD_DELIMITER, '\n', '\r']))
    {
        return Err(StateError::Serialize(format!(
            "field {bad:?} cannot be stored in a line record"
        )));
    }
    let sep = RECORD_DELIMITER.to_string();
    let mut line = fields.join(sep.as_str());
    line.push('\n');
    Ok(line)
}

/// Parse one log line (without its newline).
pub fn decode_line(line: &str) -> Result<PlacementRecord, String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields: Vec<&str> = line.split(RECORD_DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        ));
    }
    if fields[0].is_empty() || fields[1].is_empty() {
        return Err("empty node id or app name".to_string());
    }
    let resource_type = fields[2]
        .parse::<ResourceType>()
        .map_err(|e| format!("{e}"))?;
    Ok(PlacementRecord {
        node_id: fields[0].to_string(),
        app_name: fields[1].to_string(),
        resource_type,
        image: fields[3].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use placegrid_core::AppDescriptor;

    fn record(node: &str, name: &str, ty: ResourceType, image: &str) -> PlacementRecord {
        PlacementRecord::new(node, &AppDescriptor::new(name, ty, image))
    }

    fn collect(store: &LogStore) -> Vec<PlacementRecord> {
        store
            .load_all()
            .unwrap()
            .collect::<StateResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn encodes_fixed_column_order() {
        let line = encode_line(&record("node1", "svcA", ResourceType::Cpu, "img:1")).unwrap();
        assert_eq!(line, "node1;svcA;CPU;img:1\n");
    }

    #[test]
    fn encode_rejects_delimiter_in_field() {
        let bad = record("node1", "a;b", ResourceType::Memory, "img");
        assert!(matches!(encode_line(&bad), Err(StateError::Serialize(_))));
    }

    #[test]
    fn decodes_headerless_line() {
        let rec = decode_line("node2;svcB;Memory;registry.local/img:2").unwrap();
        assert_eq!(rec, record("node2", "svcB", ResourceType::Memory, "registry.local/img:2"));
    }

    #[test]
    fn decode_tolerates_crlf() {
        let rec = decode_line("node1;svcA;CPU;img:1\r").unwrap();
        assert_eq!(rec.image, "img:1");
    }

    #[test]
    fn decode_rejects_malformed_lines() {
        assert!(decode_line("node1;svcA;CPU").is_err());
        assert!(decode_line("node1;svcA;CPU;img;extra").is_err());
        assert!(decode_line("node1;svcA;cpu;img").is_err());
        assert!(decode_line(";svcA;CPU;img").is_err());
    }

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::open(&dir.path().join("deployed_apps.csv")).unwrap();
        assert!(collect(&store).is_empty());
    }

    #[test]
    fn append_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LogStore::open(&dir.path().join("deployed_apps.csv")).unwrap();

        let a = record("node1", "svcA", ResourceType::Cpu, "img:1");
        let b = record("node2", "svcB", ResourceType::Memory, "img:2");
        let c = record("node1", "svcC", ResourceType::Memory, "img:3");
        for r in [&a, &b, &c] {
            store.append(r).unwrap();
        }

        assert_eq!(collect(&store), vec![a, b, c]);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "node1;svcA;CPU;img:1\nnode2;svcB;Memory;img:2\nnode1;svcC;Memory;img:3\n");
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("deployed_apps.csv");
        {
            let mut store = LogStore::open(&path).unwrap();
            store
                .append(&record("node1", "svcA", ResourceType::Cpu, "img:1"))
                .unwrap();
        }
        let store = LogStore::open(&path).unwrap();
        assert_eq!(collect(&store).len(), 1);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployed_apps.csv");
        std::fs::write(&path, "node1;a;CPU;i\n\nnode2;b;Memory;j\n").unwrap();

        let store = LogStore::open(&path).unwrap();
        assert_eq!(collect(&store).len(), 2);
    }

    #[test]
    fn corrupt_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployed_apps.csv");
        std::fs::write(&path, "node1;a;CPU;i\ngarbage\n").unwrap();

        let store = LogStore::open(&path).unwrap();
        let results: Vec<_> = store.load_all().unwrap().collect();
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(StateError::Corrupt { line: 2, .. })));
    }

    #[test]
    fn append_after_unterminated_line_starts_fresh_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployed_apps.csv");
        std::fs::write(&path, "node1;svcA;CPU;img:1").unwrap();

        let mut store = LogStore::open(&path).unwrap();
        let b = record("node2", "svcB", ResourceType::Memory, "img:2");
        store.append(&b).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "node1;svcA;CPU;img:1\nnode2;svcB;Memory;img:2\n");
        assert_eq!(
            collect(&store),
            vec![record("node1", "svcA", ResourceType::Cpu, "img:1"), b]
        );
    }

    #[test]
    fn append_after_terminated_line_adds_no_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployed_apps.csv");
        std::fs::write(&path, "node1;svcA;CPU;img:1\n").unwrap();

        let mut store = LogStore::open(&path).unwrap();
        store
            .append(&record("node2", "svcB", ResourceType::Memory, "img:2"))
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "node1;svcA;CPU;img:1\nnode2;svcB;Memory;img:2\n");
    }

    #[test]
    fn append_to_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let mut store = LogStore::open(dir.path()).unwrap();
        let err = store
            .append(&record("node1", "svcA", ResourceType::Cpu, "img:1"))
            .unwrap_err();
        assert!(matches!(err, StateError::Io { .. }));
    }
}
