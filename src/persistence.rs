//! Persistence layer for chainfile
//!
//! A chain is stored as one pretty-printed JSON document: an array of block
//! objects keyed `index`, `timestamp`, `proof-of-work`, `transaction`,
//! `hashid`. HTML-sensitive characters and `/` are written as escapes and
//! non-ASCII text is left as-is, so files written here diff cleanly against
//! existing chain files.

use crate::blockchain::Block;
use crate::error::{ChainError, Result};
use fs2::FileExt;
use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter, PrettyFormatter};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tracing::debug;

/// Abstraction for chain storage backends: report whether a chain document
/// exists and hand back its raw bytes, or replace it wholesale.
pub trait Persistence: Send + Sync {
    /// Human-readable location used in error messages.
    fn location(&self) -> String;
    /// The stored document, or `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<u8>>>;
    /// Replace the stored document. Must never leave a partial document behind.
    fn store(&self, document: &[u8]) -> Result<()>;
}

/// Encode the full chain as the stored JSON document.
pub fn encode_chain(blocks: &[Block]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, ChainFormatter::new());
    blocks.serialize(&mut serializer)?;
    Ok(out)
}

/// Decode a stored document. `location` only feeds the error message.
pub fn decode_chain(location: &str, document: &[u8]) -> Result<Vec<Block>> {
    let blocks: Vec<Block> = serde_json::from_slice(document).map_err(|e| ChainError::CorruptChain {
        path: location.to_string(),
        reason: e.to_string(),
    })?;

    if blocks.is_empty() {
        return Err(ChainError::CorruptChain {
            path: location.to_string(),
            reason: "chain contains no blocks".to_string(),
        });
    }

    Ok(blocks)
}

/// Pretty printer with four-space indentation that escapes `<`, `>`, `&`,
/// `'`, `"` as `\u00XX` and `/` as `\/`.
struct ChainFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl<'a> ChainFormatter<'a> {
    fn new() -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for ChainFormatter<'_> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escape: &[u8] = match c {
                '<' => b"\\u003C",
                '>' => b"\\u003E",
                '&' => b"\\u0026",
                '\'' => b"\\u0027",
                '/' => b"\\/",
                '\u{2028}' => b"\\u2028",
                '\u{2029}' => b"\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escape)?;
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let escape: &[u8] = match char_escape {
            CharEscape::Quote => b"\\u0022",
            CharEscape::ReverseSolidus => b"\\\\",
            CharEscape::Solidus => b"\\/",
            CharEscape::Backspace => b"\\b",
            CharEscape::FormFeed => b"\\f",
            CharEscape::LineFeed => b"\\n",
            CharEscape::CarriageReturn => b"\\r",
            CharEscape::Tab => b"\\t",
            CharEscape::AsciiControl(byte) => {
                return write!(writer, "\\u{:04x}", byte);
            }
        };
        writer.write_all(escape)
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_object_value(writer)
    }
}

/// File-backed chain storage.
///
/// Writers hold an exclusive advisory lock on `<file>.lock` while the new
/// document is written to a temp file in the same directory, synced, and
/// renamed over the chain file. Readers therefore only ever see a complete
/// old or a complete new document.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Delete the chain file. Returns whether it was present.
    ///
    /// The lock file stays: unlinking it would let a waiting writer and a new
    /// one lock different inodes.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn replace_contents(&self, document: &[u8]) -> Result<()> {
        let mut staged = NamedTempFile::new_in(self.directory())?;
        staged.write_all(document)?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Persistence for JsonFilePersistence {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, document: &[u8]) -> Result<()> {
        fs::create_dir_all(self.directory())?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;

        let result = self.replace_contents(document);
        FileExt::unlock(&lock)?;

        if result.is_ok() {
            debug!("Stored {} bytes to {}", document.len(), self.path.display());
        }
        result
    }
}

/// Simple in-memory persistence implementation useful for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryPersistence {
    document: Arc<Mutex<Option<Vec<u8>>>>,
    read_only: Arc<AtomicBool>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stored document, if any.
    pub fn document(&self) -> Result<Option<Vec<u8>>> {
        let doc = self.document.lock().map_err(|_| ChainError::IoError("Mutex poisoned".to_string()))?;
        Ok(doc.clone())
    }

    /// Overwrite the stored document out-of-band, bypassing any chain.
    pub fn replace_document(&self, document: Vec<u8>) -> Result<()> {
        let mut doc = self.document.lock().map_err(|_| ChainError::IoError("Mutex poisoned".to_string()))?;
        *doc = Some(document);
        Ok(())
    }

    /// Reject every subsequent store with an IO error.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}

impl Persistence for InMemoryPersistence {
    fn location(&self) -> String {
        "<memory>".to_string()
    }

    fn load(&self) -> Result<Option<Vec<u8>>> {
        self.document()
    }

    fn store(&self, document: &[u8]) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(ChainError::IoError("in-memory store is read-only".to_string()));
        }
        self.replace_document(document.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_blocks() -> Vec<Block> {
        let genesis = Block::genesis();
        let next = Block::unsealed(1, "BC-1", "Jen Cook").seal(&genesis);
        vec![genesis, next]
    }

    #[test]
    fn test_encoding_layout() {
        let block = Block::new(0, Some("Fri, 16 Oct 2026 09:04:05 GMT".into()), "First Block", "init", "ab");
        let encoded = String::from_utf8(encode_chain(&[block]).unwrap()).unwrap();
        let expected = "[\n    {\n        \"index\": 0,\n        \"timestamp\": \"Fri, 16 Oct 2026 09:04:05 GMT\",\n        \"proof-of-work\": \"First Block\",\n        \"transaction\": \"init\",\n        \"hashid\": \"ab\"\n    }\n]";
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_encoding_escapes_html_and_keeps_unicode() {
        let block = Block::new(1, Some("ts".into()), "a/b", "<b>\"Zoë\" & 'Ré'</b>", "h");
        let encoded = String::from_utf8(encode_chain(&[block.clone()]).unwrap()).unwrap();
        assert!(encoded.contains(r#""a\/b""#));
        assert!(encoded.contains(
            r#""\u003Cb\u003E\u0022Zoë\u0022 \u0026 \u0027Ré\u0027\u003C\/b\u003E""#
        ));

        let decoded = decode_chain("mem", encoded.as_bytes()).unwrap();
        assert_eq!(decoded, vec![block]);
    }

    #[test]
    fn test_encoding_escapes_control_characters() {
        let block = Block::new(1, Some("ts".into()), "p", "line\nbreak\u{1}", "h");
        let encoded = String::from_utf8(encode_chain(&[block.clone()]).unwrap()).unwrap();
        assert!(encoded.contains(r#""line\nbreak\u0001""#));
        assert_eq!(decode_chain("mem", encoded.as_bytes()).unwrap(), vec![block]);
    }

    #[test]
    fn test_decode_rejects_garbage_with_location() {
        let err = decode_chain("/data/chain.json", b"{ not json").unwrap_err();
        match err {
            ChainError::CorruptChain { path, .. } => assert_eq!(path, "/data/chain.json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_empty_chain() {
        assert!(matches!(
            decode_chain("mem", b"[]"),
            Err(ChainError::CorruptChain { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let doc = br#"[{"index": 0, "timestamp": "ts", "transaction": "init", "hashid": "h"}]"#;
        assert!(matches!(
            decode_chain("mem", doc),
            Err(ChainError::CorruptChain { .. })
        ));
    }

    #[test]
    fn test_file_store_and_load() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let store = JsonFilePersistence::new(dir.path().join("nested").join("chain.json"));
        assert_eq!(store.load()?, None);

        let doc = encode_chain(&sample_blocks())?;
        store.store(&doc)?;
        assert_eq!(store.load()?, Some(doc.clone()));

        // Only the chain file and its lock remain; the staged temp file was renamed.
        let mut names: Vec<String> = fs::read_dir(dir.path().join("nested"))?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<_>>()?;
        names.sort();
        assert_eq!(names, vec!["chain.json".to_string(), "chain.json.lock".to_string()]);

        assert!(store.remove()?);
        assert!(!store.remove()?);
        assert_eq!(store.load()?, None);
        assert!(dir.path().join("nested").join("chain.json.lock").exists());
        Ok(())
    }

    #[test]
    fn test_store_waits_for_lock_holder() -> std::result::Result<(), Box<dyn std::error::Error>> {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let dir = TempDir::new()?;
        let path = dir.path().join("chain.json");
        let store = JsonFilePersistence::new(&path);
        let holder = OpenOptions::new().create(true).truncate(false).write(true).open(store.lock_path())?;
        holder.lock_exclusive()?;

        let doc = encode_chain(&sample_blocks())?;
        let (done_tx, done_rx) = mpsc::channel();
        let writer = {
            let doc = doc.clone();
            thread::spawn(move || {
                let result = store.store(&doc);
                let _ = done_tx.send(());
                result
            })
        };

        assert!(done_rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(!path.exists());

        FileExt::unlock(&holder)?;
        done_rx.recv_timeout(Duration::from_secs(10))?;
        writer.join().map_err(|_| "writer thread panicked")??;
        assert_eq!(fs::read(&path)?, doc);
        Ok(())
    }

    #[test]
    fn test_encoding_escapes_line_separators() {
        let block = Block::new(1, Some("ts".into()), "p", "a\u{2028}b\u{2029}c", "h");
        let encoded = String::from_utf8(encode_chain(&[block.clone()]).unwrap()).unwrap();
        assert!(encoded.contains(r#""a\u2028b\u2029c""#));
        assert!(!encoded.contains('\u{2028}'));
        assert_eq!(decode_chain("mem", encoded.as_bytes()).unwrap(), vec![block]);
    }

    #[test]
    fn test_in_memory_read_only_keeps_previous_document() {
        let store = InMemoryPersistence::new();
        store.store(b"first").unwrap();
        store.set_read_only(true);
        assert!(store.store(b"second").is_err());
        assert_eq!(store.load().unwrap(), Some(b"first".to_vec()));
    }
}
